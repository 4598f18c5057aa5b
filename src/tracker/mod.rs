mod controller;

pub use controller::Tracker;
