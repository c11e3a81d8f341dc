pub mod assignment;
pub mod closure;
pub mod events;
pub mod request;
pub mod shift;
pub mod staff;
pub mod template;
