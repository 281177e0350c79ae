//! # copper-io: network loading
//!
//! Reads solved networks from disk into [`copper_core::Network`].
//!
//! - [`pypsa`] - PyPSA CSV folder exports (`export_to_csv_folder`)
//! - [`credentials`] - the map tile provider token file
//!
//! ```no_run
//! use copper_io::pypsa::load_network;
//!
//! let network = load_network("networks/elec_s_all_ec")?;
//! println!("{} buses, {} snapshots", network.bus_count(), network.snapshots().len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod credentials;
pub mod pypsa;

pub use credentials::read_token;
pub use pypsa::load_network;
