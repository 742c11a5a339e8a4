pub mod evaluation;
pub mod itinerary;
pub mod slots;
