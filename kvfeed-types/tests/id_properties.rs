use kvfeed_types::{Backend, Error, Host, HostSettings, validate_id};
use proptest::prelude::*;

proptest! {
    #[test]
    fn ids_without_separator_are_accepted(id in "[^/]{1,32}") {
        prop_assert!(validate_id("id", &id).is_ok());
        prop_assert!(Backend::new(id.clone(), "http").is_ok());
        prop_assert!(Host::new(id, HostSettings::default()).is_ok());
    }

    #[test]
    fn ids_with_separator_are_rejected(head in "[^/]{0,8}", tail in "[^/]{0,8}") {
        let id = format!("{head}/{tail}");
        prop_assert!(matches!(validate_id("id", &id), Err(Error::InvalidFormat(_))));
    }
}
