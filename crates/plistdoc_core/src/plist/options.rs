/// Runtime limits applied by both decoders.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum container nesting depth.
	pub max_depth: u32,
	/// Maximum object count a binary trailer may declare.
	pub max_objects: u64,
	/// Maximum value nodes a binary decode may produce, counting every copy of a shared object.
	pub max_nodes: u64,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 512,
			max_objects: 1 << 24,
			max_nodes: 1 << 24,
		}
	}
}

impl DecodeOptions {
	/// Preset for untrusted input such as uploaded package metadata.
	pub fn strict() -> Self {
		Self {
			max_depth: 64,
			max_objects: 1 << 16,
			max_nodes: 1 << 20,
		}
	}
}
