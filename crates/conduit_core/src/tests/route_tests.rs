use super::*;

#[test]
fn location_without_fragment_is_root() {
    assert_eq!(resolve("/"), Some(Route::Root));
    assert_eq!(resolve(""), Some(Route::Root));
    assert_eq!(resolve("http://example.com/"), Some(Route::Root));
}

#[test]
fn empty_fragment_is_home() {
    assert_eq!(resolve("/#/"), Some(Route::Home));
    assert_eq!(resolve("#"), Some(Route::Home));
    assert_eq!(resolve("http://example.com/#/"), Some(Route::Home));
}

#[test]
fn resolves_fixed_routes_from_fragment_and_path() {
    assert_eq!(resolve("#/login"), Some(Route::Login));
    assert_eq!(resolve("/login"), Some(Route::Login));
    assert_eq!(resolve("#/logout"), Some(Route::Logout));
    assert_eq!(resolve("#/register"), Some(Route::Register));
    assert_eq!(resolve("/settings"), Some(Route::Settings));
    assert_eq!(resolve("#/editor"), Some(Route::NewArticle));
    assert_eq!(resolve("#/settings/"), Some(Route::Settings));
}

#[test]
fn resolves_parameterised_routes() {
    assert_eq!(
        resolve("/article/my-slug"),
        Some(Route::Article(Slug::new("my-slug")))
    );
    assert_eq!(
        resolve("#/editor/my-slug"),
        Some(Route::EditArticle(Slug::new("my-slug")))
    );
    assert_eq!(
        resolve("#/profile/jake"),
        Some(Route::Profile(Username::new("jake")))
    );
}

#[test]
fn decodes_unicode_segments() {
    assert_eq!(
        resolve("#/profile/j%C3%BCrgen"),
        Some(Route::Profile(Username::new("jürgen")))
    );
    assert_eq!(
        resolve("/article/caf%C3%A9-au-lait"),
        Some(Route::Article(Slug::new("café-au-lait")))
    );
    assert_eq!(
        resolve("#/profile/jürgen"),
        Some(Route::Profile(Username::new("jürgen")))
    );
}

#[test]
fn unknown_locations_do_not_resolve() {
    assert_eq!(resolve("#/nope"), None);
    assert_eq!(resolve("/article"), None);
    assert_eq!(resolve("#/article/a/b"), None);
    assert_eq!(resolve("#/profile"), None);
}

#[test]
fn href_round_trips_through_resolver() {
    let routes = [
        Route::Home,
        Route::Login,
        Route::Settings,
        Route::NewArticle,
        Route::Profile(Username::new("jürgen smith")),
        Route::Article(Slug::new("how-to/train")),
        Route::EditArticle(Slug::new("x")),
    ];
    for route in routes {
        assert_eq!(resolve(&route.href()), Some(route.clone()), "{route:?}");
    }
}
