pub mod books;
pub mod clubs;
pub mod reviews;
pub mod users;

use bookclub_kernel::ModuleRegistry;

/// Register every resource module with the registry
pub fn register_all(registry: &mut ModuleRegistry) -> anyhow::Result<()> {
    registry.register(users::create_module())?;
    registry.register(books::create_module())?;
    registry.register(clubs::create_module())?;
    registry.register(reviews::create_module())?;
    Ok(())
}
