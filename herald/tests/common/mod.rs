#![allow(dead_code)]

use herald::{
    BusinessEventEmitter, EmissionError, EmitConfig, EmitsBusinessEvents, JoinPoint,
    MethodSignature, Nullable, impl_payload,
};
use serde::Serialize;
use std::sync::{Arc, Mutex};

// ============================================================================
// Test Payload Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: u64,
    pub status: String,
}

impl Order {
    pub fn new(id: u64, status: &str) -> Self {
        Self {
            id,
            status: status.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Employee {
    pub person: Person,
    pub team: String,
}

impl Employee {
    pub fn new(name: &str, team: &str) -> Self {
        Self {
            person: Person {
                name: name.to_string(),
            },
            team: team.to_string(),
        }
    }
}

impl_payload!(Order, Person);
impl_payload!(Employee: person => Person);

// ============================================================================
// Test Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Emission(#[from] EmissionError),

    #[error("order {0} not found")]
    NotFound(u64),
}

// ============================================================================
// Test Services
// ============================================================================

/// An order service that wraps its operations by hand.
pub struct OrderService {
    pub emitter: Option<BusinessEventEmitter>,
    pub orders: Mutex<Vec<Order>>,
}

impl OrderService {
    pub fn new(emitter: Option<BusinessEventEmitter>) -> Self {
        Self {
            emitter,
            orders: Mutex::new(Vec::new()),
        }
    }

    pub fn intercept<T, F>(&self, name: &str, config: EmitConfig, proceed: F) -> Result<T, ServiceError>
    where
        T: herald::ReturnValue,
        F: FnOnce() -> Result<T, ServiceError>,
    {
        let signature = MethodSignature::new(std::any::type_name::<Self>(), name).returning::<T>();
        match self.business_event_emitter() {
            Some(emitter) => emitter.around(JoinPoint::new(self, &signature, &config), proceed),
            None => proceed(),
        }
    }

    pub fn place(&self, order: Order) -> Result<Order, ServiceError> {
        self.intercept("place", EmitConfig::default().action("CREATE"), || {
            self.orders.lock().unwrap().push(order.clone());
            Ok(order)
        })
    }

    pub fn place_all(&self, orders: Vec<Order>) -> Result<Vec<Order>, ServiceError> {
        self.intercept("place_all", EmitConfig::default().action("CREATE"), || {
            self.orders.lock().unwrap().extend(orders.iter().cloned());
            Ok(orders)
        })
    }

    pub fn archive_all(&self, orders: Vec<Order>) -> Result<Vec<Order>, ServiceError> {
        self.intercept(
            "archive_all",
            EmitConfig::default().action("ARCHIVE").skip_unwrap(true),
            || Ok(orders),
        )
    }

    pub fn change_status(&self, id: u64, status: &str) -> Result<Order, ServiceError> {
        let config = EmitConfig::default()
            .action("UPDATE")
            .action_expression(r#"if(payload.status == "CANCELLED", "CANCEL", ())"#);
        self.intercept("change_status", config, || {
            let mut orders = self.orders.lock().unwrap();
            let order = orders
                .iter_mut()
                .find(|order| order.id == id)
                .ok_or(ServiceError::NotFound(id))?;
            order.status = status.to_string();
            Ok(order.clone())
        })
    }

    pub fn find(&self, id: u64) -> Result<Nullable<Order>, ServiceError> {
        self.intercept("find", EmitConfig::default().action("READ"), || {
            let orders = self.orders.lock().unwrap();
            Ok(orders.iter().find(|order| order.id == id).cloned().into())
        })
    }
}

impl EmitsBusinessEvents for OrderService {
    fn business_event_emitter(&self) -> Option<&BusinessEventEmitter> {
        self.emitter.as_ref()
    }
}

// ============================================================================
// Test Listener Owners
// ============================================================================

/// A listener owner keeping a journal of what it was called with.
#[derive(Default)]
pub struct Journal {
    pub lines: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn write(&self, line: String) {
        self.lines.lock().unwrap().push(line);
    }
}
