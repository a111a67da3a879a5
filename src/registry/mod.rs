/*!
 * Registry Module
 * Per-sandbox descriptor table owning bridged native handles
 */

mod table;
mod types;

pub use table::DescriptorRegistry;
pub use types::{DescriptorInfo, Rejected, RegistryError};
