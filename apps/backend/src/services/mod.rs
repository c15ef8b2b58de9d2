pub mod clock;
pub mod deadlines;
pub mod match_flow;
pub mod notifications;
pub mod players;
pub mod realtime;
