pub mod accommodation;
pub mod location;
pub mod member;
pub mod notification;
pub mod owner;
pub mod rating;
pub mod reservation;
pub mod role;
pub mod specialist;
pub mod university;
