// Ranking: ordered resume scores with rank-delta tracking.
// No I/O here; the session owns the manager and drives its transitions.

pub mod manager;
