pub mod describe;
pub mod fonts;
pub mod inspect;
pub mod template;
