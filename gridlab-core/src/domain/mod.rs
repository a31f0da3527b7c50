//! Domain types shared by every engine component.

pub mod direction;
pub mod exchange;
pub mod fill;
pub mod intent;
pub mod sample;

pub use direction::Direction;
pub use exchange::ExchangeConstraints;
pub use fill::{Fill, FillConfirmation};
pub use intent::{EntryIntent, EntrySignal, FlattenIntent};
pub use sample::PriceSample;
