use super::event::Event;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

/// Receives every public event, synchronously, inside the writer's
/// critical section.
///
/// Handlers must return quickly and must not call back into the engine:
/// the bus traps nested emission, and a handler that blocks stalls the
/// match. Handlers needing I/O hand the event off to their own task
/// queue.
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &Event);
}

/// Ordered, synchronous fan-out of typed events.
///
/// For any two events of one match, all observers see them in emission
/// order; cross-match ordering is not guaranteed.
pub struct Bus {
    observers: Vec<Box<dyn Observer>>,
    emitting: AtomicBool,
}

impl Bus {
    pub fn new(observers: Vec<Box<dyn Observer>>) -> Self {
        Self {
            observers,
            emitting: AtomicBool::new(false),
        }
    }
    pub fn emit(&self, event: &Event) {
        if self.emitting.swap(true, Ordering::SeqCst) {
            panic!("observer re-entered the event bus: {}", event.kind());
        }
        log::trace!("[bus] {}", event);
        for observer in &self.observers {
            observer.on_event(event);
        }
        self.emitting.store(false, Ordering::SeqCst);
    }
}

/// Observer that records every event; for tests and inspection.
#[derive(Clone, Default)]
pub struct Collector(std::sync::Arc<Mutex<Vec<Event>>>);

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn events(&self) -> Vec<Event> {
        self.0.lock().expect("collector lock").clone()
    }
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(Event::kind).collect()
    }
    pub fn count(&self, kind: &str) -> usize {
        self.kinds().iter().filter(|k| **k == kind).count()
    }
}

impl Observer for Collector {
    fn on_event(&self, event: &Event) {
        self.0.lock().expect("collector lock").push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_out_preserves_order() {
        let collector = Collector::new();
        let bus = Bus::new(vec![Box::new(collector.clone())]);
        bus.emit(&Event::TrickStarted { leader: 0 });
        bus.emit(&Event::PlayerPassed { seat: 1 });
        assert_eq!(collector.kinds(), vec!["trick_started", "player_passed"]);
    }

    #[test]
    #[should_panic(expected = "re-entered")]
    fn nested_emission_is_trapped() {
        struct Nested(std::sync::Weak<Bus>);
        impl Observer for Nested {
            fn on_event(&self, event: &Event) {
                if let Some(bus) = self.0.upgrade() {
                    bus.emit(event);
                }
            }
        }
        let bus = std::sync::Arc::new_cyclic(|weak: &std::sync::Weak<Bus>| {
            Bus::new(vec![Box::new(Nested(weak.clone()))])
        });
        bus.emit(&Event::TributeStarted);
    }
}
