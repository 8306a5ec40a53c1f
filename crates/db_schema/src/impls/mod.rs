pub mod comment;
pub mod follower;
pub mod like;
pub mod post;
pub mod user;
