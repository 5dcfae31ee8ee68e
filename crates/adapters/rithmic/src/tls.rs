// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! TLS client configuration trusting a PEM certificate bundle.

use std::{fs::File, io::BufReader, path::Path, sync::Arc};

use rustls::{ClientConfig, RootCertStore, pki_types::CertificateDer};
use tracing::{debug, warn};

use crate::websocket::error::{RithmicWsError, RithmicWsResult};

/// Builds a rustls client configuration whose only trust anchors are the
/// certificates in the PEM bundle at `path`.
///
/// # Errors
///
/// Returns [`RithmicWsError::TlsSetupFailure`] if the bundle cannot be read or
/// contains no usable certificate.
pub fn create_tls_config_from_bundle(path: &Path) -> RithmicWsResult<Arc<ClientConfig>> {
    let certs = load_certs(path)?;
    if certs.is_empty() {
        return Err(RithmicWsError::TlsSetupFailure(format!(
            "No certificates found in {path:?}"
        )));
    }

    let mut root_store = RootCertStore::empty();
    for cert in certs {
        if let Err(e) = root_store.add(cert) {
            warn!("Invalid certificate in {path:?}: {e}");
        }
    }

    if root_store.is_empty() {
        return Err(RithmicWsError::TlsSetupFailure(format!(
            "No valid certificates in {path:?}"
        )));
    }

    debug!(roots = root_store.len(), "Loaded trust bundle from {path:?}");

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| RithmicWsError::TlsSetupFailure(e.to_string()))?
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(Arc::new(config))
}

fn load_certs(path: &Path) -> RithmicWsResult<Vec<CertificateDer<'static>>> {
    let file = File::open(path).map_err(|e| {
        RithmicWsError::TlsSetupFailure(format!("Cannot open trust bundle {path:?}: {e}"))
    })?;
    let mut reader = BufReader::new(file);
    let certs = rustls_pemfile::certs(&mut reader)
        .filter_map(Result::ok)
        .collect();
    Ok(certs)
}
