pub mod counting_session;
