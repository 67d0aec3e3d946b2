//! TLS verification modes for the blocking client.

use ureq::tls::{RootCerts, TlsConfig, TlsProvider};

/// Certificate and hostname verification mode.
///
/// `Insecure` replaces certificate validation and hostname verification with
/// always-accept logic, for use against self-signed endpoints. The mode is
/// fixed per client instance at construction; a trusting and a strict client
/// can coexist in the same process, and the URL scheme alone decides whether
/// a connection uses TLS at all.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TlsMode {
    /// Default TLS verification against the platform trust store.
    #[default]
    Verify,

    /// Insecure: accept any certificate and any hostname.
    Insecure,
}

pub(crate) fn tls_config(mode: TlsMode) -> TlsConfig {
    let mut builder = TlsConfig::builder()
        .provider(TlsProvider::NativeTls)
        .root_certs(RootCerts::PlatformVerifier);

    if mode == TlsMode::Insecure {
        builder = builder.disable_verification(true);
    }

    builder.build()
}
