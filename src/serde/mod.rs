pub(crate) mod de;
pub(crate) mod ser;
