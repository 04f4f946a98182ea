mod events;

pub use events::TracingEventEmitter;
