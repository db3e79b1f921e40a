use spirv_builder::{Capability, MetadataPrintout, SpirvBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Exposes the module path as `env!("shaders.spv")`.
    SpirvBuilder::new("shaders", "spirv-unknown-vulkan1.1")
        .capability(Capability::Int8)
        .print_metadata(MetadataPrintout::Full)
        .build()?;
    Ok(())
}
