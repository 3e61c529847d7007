//! No library surface of its own: a home for end-to-end scenario tests
//! (see `tests/scenarios.rs`) that spin up real validator tasks against the
//! real gossip fabric, the way the teacher's own integration suite does.
