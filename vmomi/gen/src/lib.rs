//! Vmodl code generator library.
//!
//! This crate turns a vmodl schema document (loaded with `vmomi-define`) into
//! a typed Rust module built on the `vmomi` runtime. The generated module
//! contains:
//!
//! - One enum per enum type, speaking the wire values through serde and strum
//! - One struct per data type, embedding its parent as a flattened `base`
//! - One handle struct per managed type, with an async method per operation
//! - A `descriptor_registry()` function that runtime reconstruction walks
//! - A `connect()` helper binding a transport to that registry
//!
//! ## Modules
//!
//! - [`index`] - The qualified-name table built once per run
//! - [`resolve`] - Wire type to Rust type resolution
//! - [`naming`] - Identifier sanitising
//! - [`codegen`] - Code generation for individual declarations
//! - [`output`] - Final assembly, validation, and file writing
//! - [`cargo_gen`] - Cargo.toml generation for the output package
//! - [`extract`] - The external schema extraction step
//! - [`config`] - Generator options
//! - [`errors`] - Error types for the generator
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use vmomi_define::SchemaModel;
//! use vmomi_gen::config::GeneratorOptions;
//! use vmomi_gen::output::generate_and_write;
//!
//! let schema = SchemaModel::load(Path::new("vmomi.json")).unwrap();
//! let options = GeneratorOptions::default();
//!
//! // Generate code (dry_run=true prints instead of writing)
//! let code = generate_and_write(&schema, &options, Path::new("generated/src"), true).unwrap();
//! println!("{}", code);
//! ```
//!
//! ## Generated Code Structure
//!
//! ```text
//! pub enum VirtualMachinePowerState { PoweredOff, PoweredOn, Suspended }
//!
//! pub struct VirtualMachineRuntimeInfo {
//!     pub base: vmomi::DynamicData,
//!     pub power_state: VirtualMachinePowerState,
//!     pub host: Option<Box<HostSystem>>,
//! }
//!
//! pub struct VirtualMachine {
//!     pub base: ManagedEntity,
//!     pub runtime: Option<Box<VirtualMachineRuntimeInfo>>,
//! }
//!
//! impl VirtualMachine {
//!     pub async fn power_on(&self, args: VirtualMachinePowerOnArgs) -> Result<Task, vmomi::VmomiError>;
//! }
//!
//! pub fn descriptor_registry() -> vmomi::DescriptorRegistry;
//! pub fn connect(transport: impl vmomi::Transport + 'static) -> vmomi::Connection;
//! ```

pub mod cargo_gen;
pub mod codegen;
pub mod config;
pub mod errors;
pub mod extract;
pub mod index;
pub mod naming;
pub mod output;
pub mod resolve;

#[cfg(test)]
pub(crate) mod test_utils;
