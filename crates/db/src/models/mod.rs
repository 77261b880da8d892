pub mod admin_user;
pub mod blog;
pub mod category;
pub mod client;
pub mod education;
pub mod experience;
pub mod personal_info;
pub mod portfolio_project;
pub mod project;
pub mod skill;
pub mod social_link;
pub mod testimonial;
