// Object-store connection guard

use crate::common::error::Result;

/// Access credentials for the object store
#[derive(Debug, Clone)]
pub struct StoreKeys {
    pub access_key: String,
    pub secret_key: String,
}

/// Connection factory for the object store backing a delivery session.
///
/// Implementations wrap whatever transport the deployment uses; the
/// core only needs a session handle or a failure.
pub trait Connector {
    type Session;

    fn connect(&self, endpoint_url: &str, keys: &StoreKeys) -> Result<Self::Session>;
}

/// Lazily-established connection to the object store.
///
/// `with_connection` is re-invoked per logical unit of work. On any
/// connection-layer error it clears the held endpoint and keys, records
/// a descriptive message, and never invokes the wrapped operation. The
/// last session handle is kept so callers that want to reuse it between
/// calls can.
pub struct RemoteSession<C: Connector> {
    connector: C,
    endpoint_url: Option<String>,
    keys: Option<StoreKeys>,
    session: Option<C::Session>,
    message: String,
}

impl<C: Connector> RemoteSession<C> {
    pub fn new(connector: C, endpoint_url: String, keys: StoreKeys) -> Self {
        Self {
            connector,
            endpoint_url: Some(endpoint_url),
            keys: Some(keys),
            session: None,
            message: String::new(),
        }
    }

    /// Last connection error message, empty if none
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True once a connection failure has cleared the endpoint and keys
    pub fn is_disconnected(&self) -> bool {
        self.endpoint_url.is_none() || self.keys.is_none()
    }

    /// The cached session handle from the last successful connection
    pub fn session(&mut self) -> Option<&mut C::Session> {
        self.session.as_mut()
    }

    /// Connect and run `op` with the live session.
    ///
    /// Returns `None` without invoking `op` if no endpoint/keys are held
    /// or the connection attempt fails.
    pub fn with_connection<F, T>(&mut self, op: F) -> Option<T>
    where
        F: FnOnce(&mut C::Session) -> T,
    {
        let (endpoint, keys) = match (&self.endpoint_url, &self.keys) {
            (Some(endpoint), Some(keys)) => (endpoint.clone(), keys.clone()),
            _ => {
                self.message = "Store connection failed: session is disconnected".to_string();
                log::warn!("{}", self.message);
                return None;
            }
        };

        match self.connector.connect(&endpoint, &keys) {
            Ok(mut session) => {
                log::info!("Connection to object store established.");
                let result = op(&mut session);
                self.session = Some(session);
                Some(result)
            }
            Err(err) => {
                self.endpoint_url = None;
                self.keys = None;
                self.session = None;
                self.message = format!("Store connection failed: {}", err);
                log::warn!("{}", self.message);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::Error;

    struct FlakyConnector {
        fail: bool,
    }

    impl Connector for FlakyConnector {
        type Session = u32;

        fn connect(&self, _endpoint_url: &str, keys: &StoreKeys) -> Result<u32> {
            if self.fail || keys.access_key.is_empty() {
                return Err(Error::Connection("credentials rejected".to_string()));
            }
            Ok(7)
        }
    }

    fn keys() -> StoreKeys {
        StoreKeys {
            access_key: "ak".to_string(),
            secret_key: "sk".to_string(),
        }
    }

    #[test]
    fn test_successful_connection_runs_op() {
        let mut remote = RemoteSession::new(
            FlakyConnector { fail: false },
            "http://store".to_string(),
            keys(),
        );

        let result = remote.with_connection(|session| *session * 2);
        assert_eq!(result, Some(14));
        assert!(!remote.is_disconnected());
        assert_eq!(remote.session().copied(), Some(7));
    }

    #[test]
    fn test_failure_clears_endpoint_and_keys_and_skips_op() {
        let mut remote = RemoteSession::new(
            FlakyConnector { fail: true },
            "http://store".to_string(),
            keys(),
        );

        let mut ran = false;
        let result = remote.with_connection(|_session| {
            ran = true;
        });
        assert!(result.is_none());
        assert!(!ran);
        assert!(remote.is_disconnected());
        assert!(remote.message().contains("Store connection failed"));
        assert!(remote.session().is_none());
    }

    #[test]
    fn test_disconnected_session_short_circuits() {
        let mut remote = RemoteSession::new(
            FlakyConnector { fail: true },
            "http://store".to_string(),
            keys(),
        );
        assert!(remote.with_connection(|_| ()).is_none());

        // A later call must not retry with cleared credentials.
        let result = remote.with_connection(|_| ());
        assert!(result.is_none());
        assert!(remote.message().contains("disconnected"));
    }
}
