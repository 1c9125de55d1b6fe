pub(crate) mod resources;
pub(crate) mod rooms;
