//! Query-string parameters of an update request
//!
//! Callers send `user`, `password`, `ipv4` and `ipv6`. An empty value is
//! treated the same as a missing one.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Parameters of a single update request
#[derive(Clone, PartialEq, Eq)]
pub struct UpdateParams {
    /// Presented user name
    pub user: String,
    /// Presented password
    pub password: String,
    /// New IPv4 address, if supplied
    pub ipv4: Option<Ipv4Addr>,
    /// New IPv6 address, if supplied
    pub ipv6: Option<Ipv6Addr>,
}

impl UpdateParams {
    /// Extract parameters from a decoded query string
    ///
    /// # Errors
    ///
    /// [`Error::MalformedRequest`] when `user` or `password` is missing, when
    /// `ipv4` is missing and `require_ipv4` is set, or when an address does
    /// not parse for its family. IPv4 octets with leading zeros are refused;
    /// IPv6 addresses are forwarded in canonical form.
    pub fn from_query(query: &HashMap<String, String>, require_ipv4: bool) -> Result<Self> {
        let user = non_empty(query, "user").ok_or_else(|| Error::malformed("missing user"))?;
        let password =
            non_empty(query, "password").ok_or_else(|| Error::malformed("missing password"))?;

        let ipv4 = non_empty(query, "ipv4")
            .map(|raw| {
                raw.parse::<Ipv4Addr>()
                    .map_err(|_| Error::malformed(format!("invalid ipv4 address: {}", raw)))
            })
            .transpose()?;

        if require_ipv4 && ipv4.is_none() {
            return Err(Error::malformed("missing ipv4"));
        }

        let ipv6 = non_empty(query, "ipv6")
            .map(|raw| {
                raw.parse::<Ipv6Addr>()
                    .map_err(|_| Error::malformed(format!("invalid ipv6 address: {}", raw)))
            })
            .transpose()?;

        Ok(Self {
            user: user.to_string(),
            password: password.to_string(),
            ipv4,
            ipv6,
        })
    }
}

fn non_empty<'a>(query: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    query
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

impl fmt::Debug for UpdateParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateParams")
            .field("user", &self.user)
            .field("password", &"<REDACTED>")
            .field("ipv4", &self.ipv4)
            .field("ipv6", &self.ipv6)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_full_query() {
        let params = UpdateParams::from_query(
            &query(&[
                ("user", "a"),
                ("password", "b"),
                ("ipv4", "1.2.3.4"),
                ("ipv6", "2001:db8::1"),
            ]),
            true,
        )
        .unwrap();

        assert_eq!(params.user, "a");
        assert_eq!(params.ipv4, Some(Ipv4Addr::new(1, 2, 3, 4)));
        assert_eq!(params.ipv6, Some("2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn test_missing_credentials() {
        for q in [
            query(&[("password", "b"), ("ipv4", "1.2.3.4")]),
            query(&[("user", "a"), ("ipv4", "1.2.3.4")]),
            query(&[("user", ""), ("password", "b"), ("ipv4", "1.2.3.4")]),
            query(&[]),
        ] {
            let err = UpdateParams::from_query(&q, false).unwrap_err();
            assert!(matches!(err, Error::MalformedRequest(_)), "{:?}", q);
        }
    }

    #[test]
    fn test_ipv4_required_only_in_strict_mode() {
        let q = query(&[("user", "a"), ("password", "b")]);
        assert!(matches!(
            UpdateParams::from_query(&q, true),
            Err(Error::MalformedRequest(_))
        ));

        let params = UpdateParams::from_query(&q, false).unwrap();
        assert_eq!(params.ipv4, None);
        assert_eq!(params.ipv6, None);
    }

    #[test]
    fn test_empty_ipv6_is_absent() {
        let q = query(&[("user", "a"), ("password", "b"), ("ipv4", "1.2.3.4"), ("ipv6", "")]);
        assert_eq!(UpdateParams::from_query(&q, true).unwrap().ipv6, None);
    }

    #[test]
    fn test_wrong_address_family_rejected() {
        let q = query(&[("user", "a"), ("password", "b"), ("ipv4", "2001:db8::1")]);
        assert!(UpdateParams::from_query(&q, true).is_err());

        let q = query(&[("user", "a"), ("password", "b"), ("ipv4", "1.2.3.4"), ("ipv6", "1.2.3.4")]);
        assert!(UpdateParams::from_query(&q, true).is_err());

        let q = query(&[("user", "a"), ("password", "b"), ("ipv4", "not-an-ip")]);
        assert!(UpdateParams::from_query(&q, true).is_err());
    }

    #[test]
    fn test_leading_zero_ipv4_rejected() {
        let q = query(&[("user", "a"), ("password", "b"), ("ipv4", "010.1.1.1")]);
        assert!(matches!(
            UpdateParams::from_query(&q, true),
            Err(Error::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_ipv6_canonical_form() {
        let q = query(&[("user", "a"), ("password", "b"), ("ipv6", "2001:DB8:0:0::1")]);
        let params = UpdateParams::from_query(&q, false).unwrap();
        assert_eq!(params.ipv6.unwrap().to_string(), "2001:db8::1");
    }

    #[test]
    fn test_password_not_exposed_in_debug() {
        let q = query(&[("user", "a"), ("password", "s3cret"), ("ipv4", "1.2.3.4")]);
        let params = UpdateParams::from_query(&q, true).unwrap();
        assert!(!format!("{:?}", params).contains("s3cret"));
    }
}
