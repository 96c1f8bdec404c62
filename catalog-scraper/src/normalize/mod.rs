pub mod date;
pub mod discipline;
pub mod pony;
pub mod postcode;
pub mod url;
pub mod venue_name;

pub use date::parse_event_date;
pub use discipline::{infer_discipline, normalise_discipline};
pub use pony::detect_pony_classes;
pub use postcode::normalise_postcode;
pub use url::sanitize_url;
pub use venue_name::{normalise_venue_name, TBC};
