mod bearer;

pub use bearer::BearerToken;
