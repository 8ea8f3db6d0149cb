pub mod artwork;
pub mod resolver;
pub mod widget;
