#[cfg(feature = "auto_register")]
pub use inventory;

/// One link-time registration submitted by [`auto_register!`](crate::auto_register).
#[cfg(feature = "auto_register")]
pub struct AutoRegister(pub fn(&mut crate::describe::TypeCatalog));

#[cfg(feature = "auto_register")]
inventory::collect!(AutoRegister);
