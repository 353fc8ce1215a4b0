use super::certificate::CertHash;
use crate::access::{Address, Role};
use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RegistryEvent {
    CertificateIssued {
        cert_hash: CertHash,
        student: Address,
    },
    RoleGranted {
        role: Role,
        account: Address,
        sender: Address,
    },
    RoleRevoked {
        role: Role,
        account: Address,
        sender: Address,
    },
}

/// Fan-out of registry events. Emitting with no subscribers is not an error.
pub struct EventBus {
    sender: broadcast::Sender<RegistryEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: RegistryEvent) {
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_events() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        let event = RegistryEvent::CertificateIssued {
            cert_hash: CertHash::new([1; 32]),
            student: Address::from_label("s"),
        };
        bus.emit(event.clone());
        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[test]
    fn emit_without_subscribers() {
        let bus = EventBus::new(0);
        bus.emit(RegistryEvent::RoleGranted {
            role: Role::admin(),
            account: Address::ZERO,
            sender: Address::ZERO,
        });
    }
}
