use log::debug;

use super::types::OptionChoice;
use super::{
    KEY_MODE, KEY_RESTRICTIONS, KEY_WALK_SPEED, RawRouteOptions, RestrictionPreference,
    RouteMode, RouteOptions, WAYTYPE_KEY_PREFIX, WalkSpeed, WayTypePolicy,
};
use crate::OptionsError;
use crate::model::WayTypeCatalog;

/// Merges three tiers of preferences into a complete [`RouteOptions`].
///
/// `defaults` is completed against `catalog` first: way types it lacks get
/// their catalog default, way types the catalog no longer has are dropped.
/// Stored preferences are applied next and may be stale, so unknown keys
/// there are skipped. Request overrides come last; their unknown keys are
/// skipped only when `ignore_unknown` is set. Invalid values are an error in
/// every tier.
pub fn resolve(
    catalog: &WayTypeCatalog,
    defaults: &RouteOptions,
    stored: Option<&RawRouteOptions>,
    overrides: &RawRouteOptions,
    ignore_unknown: bool,
) -> Result<RouteOptions, OptionsError> {
    let mut options = RouteOptions::defaults(catalog);
    options.mode = defaults.mode;
    options.walk_speed = defaults.walk_speed;
    options.restrictions = defaults.restrictions;
    for (name, policy) in options.way_types.iter_mut() {
        if let Some(preferred) = defaults.way_types.get(name) {
            *policy = *preferred;
        }
    }

    if let Some(stored) = stored {
        apply(&mut options, catalog, stored, true)?;
    }
    apply(&mut options, catalog, overrides, ignore_unknown)?;
    Ok(options)
}

fn apply(
    options: &mut RouteOptions,
    catalog: &WayTypeCatalog,
    raw: &RawRouteOptions,
    ignore_unknown: bool,
) -> Result<(), OptionsError> {
    for (key, value) in raw.iter() {
        match key {
            KEY_MODE => options.mode = RouteMode::parse(value)?,
            KEY_WALK_SPEED => options.walk_speed = WalkSpeed::parse(value)?,
            KEY_RESTRICTIONS => options.restrictions = RestrictionPreference::parse(value)?,
            _ => {
                let waytype = key
                    .strip_prefix(WAYTYPE_KEY_PREFIX)
                    .and_then(|name| catalog.by_name(name));
                let Some(waytype) = waytype else {
                    if ignore_unknown {
                        debug!("Ignoring unknown route option '{key}'");
                        continue;
                    }
                    return Err(OptionsError::invalid(format!("unknown option '{key}'")));
                };

                let policy = WayTypePolicy::parse(value)?;
                if policy.is_directional() && !waytype.up_separate {
                    return Err(OptionsError::invalid(format!(
                        "{} cannot be avoided by direction",
                        waytype.title_plural
                    )));
                }
                options.way_types.insert(waytype.name.clone(), policy);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::waytype::test_waytype;

    fn catalog() -> WayTypeCatalog {
        WayTypeCatalog::from_types(vec![
            test_waytype(1, "stairs", true),
            test_waytype(2, "elevator", false),
        ])
    }

    fn raw(s: &str) -> RawRouteOptions {
        s.parse().unwrap()
    }

    #[test]
    fn tiers_apply_in_order() {
        let catalog = catalog();
        let defaults = RouteOptions::defaults(&catalog);
        let stored = raw("mode=shortest,walk_speed=slow,waytype_stairs=avoid");
        let overrides = raw("walk_speed=fast");

        let options = resolve(&catalog, &defaults, Some(&stored), &overrides, false).unwrap();
        assert_eq!(options.mode(), RouteMode::Shortest);
        assert_eq!(options.walk_speed(), WalkSpeed::Fast);
        assert_eq!(options.restrictions(), RestrictionPreference::Normal);
        assert_eq!(options.policy("stairs"), WayTypePolicy::Avoid);
        assert_eq!(options.policy("elevator"), WayTypePolicy::Allow);
    }

    #[test]
    fn unknown_keys_follow_the_flag() {
        let catalog = catalog();
        let defaults = RouteOptions::defaults(&catalog);
        let overrides = raw("mode=fastest,waytype_ladder=avoid");

        assert!(matches!(
            resolve(&catalog, &defaults, None, &overrides, false),
            Err(OptionsError::InvalidRouteOptions(msg)) if msg.contains("waytype_ladder")
        ));
        assert!(resolve(&catalog, &defaults, None, &overrides, true).is_ok());

        let stale = raw("colour=blue");
        assert!(resolve(&catalog, &defaults, Some(&stale), &RawRouteOptions::new(), false).is_ok());
    }

    #[test]
    fn invalid_values_are_never_ignored() {
        let catalog = catalog();
        let defaults = RouteOptions::defaults(&catalog);
        assert!(resolve(&catalog, &defaults, None, &raw("walk_speed=sprint"), true).is_err());
        assert!(
            resolve(&catalog, &defaults, Some(&raw("mode=scenic")), &RawRouteOptions::new(), true)
                .is_err()
        );
    }

    #[test]
    fn directional_avoidance_needs_separable_type() {
        let catalog = catalog();
        let defaults = RouteOptions::defaults(&catalog);
        let ok = resolve(&catalog, &defaults, None, &raw("waytype_stairs=avoid_up"), false).unwrap();
        assert_eq!(ok.policy("stairs"), WayTypePolicy::AvoidUp);

        let err = resolve(&catalog, &defaults, None, &raw("waytype_elevator=avoid_down"), false)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid route options: elevators cannot be avoided by direction"
        );
    }

    #[test]
    fn serialized_options_resolve_to_themselves() {
        let catalog = catalog();
        let defaults = RouteOptions::defaults(&catalog);
        let options = resolve(
            &catalog,
            &defaults,
            None,
            &raw("mode=shortest,restrictions=avoid,waytype_stairs=avoid_down"),
            false,
        )
        .unwrap();

        let reparsed = raw(&options.serialize());
        let again = resolve(&catalog, &defaults, None, &reparsed, false).unwrap();
        assert_eq!(again, options);
    }

    #[test]
    fn defaults_are_completed_against_catalog() {
        let old = RouteOptions::defaults(&WayTypeCatalog::from_types(vec![
            test_waytype(1, "stairs", true),
            test_waytype(9, "ladder", false),
        ]));
        let options = resolve(&catalog(), &old, None, &RawRouteOptions::new(), false).unwrap();
        let names: Vec<_> = options.way_types().map(|(name, _)| name).collect();
        assert_eq!(names, ["elevator", "stairs"]);
    }
}
