//! Client-side routes and the session guard

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    ForgotPassword,
    ResetPassword(String),
    Home,
    Search,
    Playlists,
    Playlist(String),
    Song(String),
    Album(String),
    LikedSongs,
    Downloads,
    Queue,
    /// Anything that did not parse; resolved by `guard`
    Unknown(String),
}

impl Route {
    /// Parses a path such as `/playlist/abc`. `/` and the empty path are home.
    pub fn parse(path: &str) -> Route {
        let trimmed = path.trim().trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["forgot-password"] => Route::ForgotPassword,
            ["reset-password", token] => Route::ResetPassword(token.to_string()),
            ["home"] => Route::Home,
            ["search"] => Route::Search,
            ["playlists"] => Route::Playlists,
            ["playlist", id] => Route::Playlist(id.to_string()),
            ["song", id] => Route::Song(id.to_string()),
            ["album", id] => Route::Album(id.to_string()),
            ["liked-songs"] => Route::LikedSongs,
            ["downloads"] => Route::Downloads,
            ["queue"] => Route::Queue,
            _ => Route::Unknown(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::ResetPassword(token) => format!("/reset-password/{}", token),
            Route::Home => "/home".to_string(),
            Route::Search => "/search".to_string(),
            Route::Playlists => "/playlists".to_string(),
            Route::Playlist(id) => format!("/playlist/{}", id),
            Route::Song(id) => format!("/song/{}", id),
            Route::Album(id) => format!("/album/{}", id),
            Route::LikedSongs => "/liked-songs".to_string(),
            Route::Downloads => "/downloads".to_string(),
            Route::Queue => "/queue".to_string(),
            Route::Unknown(path) => path.clone(),
        }
    }

    pub fn is_auth_screen(&self) -> bool {
        matches!(
            self,
            Route::Login | Route::Register | Route::ForgotPassword | Route::ResetPassword(_)
        )
    }

    pub fn is_protected(&self) -> bool {
        !self.is_auth_screen() && !matches!(self, Route::Unknown(_))
    }

    /// Where the user actually lands when asking for `self`
    pub fn guard(self, authenticated: bool) -> Route {
        match self {
            Route::Unknown(_) if authenticated => Route::Home,
            Route::Unknown(_) => Route::Login,
            route if route.is_protected() && !authenticated => Route::Login,
            route => route,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_and_home_are_the_same_route() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/home/"), Route::Home);
    }

    #[test]
    fn parameterised_routes_keep_their_id() {
        assert_eq!(Route::parse("/playlist/p1"), Route::Playlist("p1".into()));
        assert_eq!(Route::parse("/song/s9"), Route::Song("s9".into()));
        assert_eq!(
            Route::parse("/reset-password/tok123"),
            Route::ResetPassword("tok123".into())
        );
        assert_eq!(Route::Playlist("p1".into()).path(), "/playlist/p1");
    }

    #[test]
    fn protected_routes_redirect_to_login_without_session() {
        for path in ["/home", "/search", "/playlists", "/playlist/x", "/song/y", "/liked-songs", "/downloads"] {
            assert_eq!(Route::parse(path).guard(false), Route::Login, "{}", path);
        }
    }

    #[test]
    fn auth_routes_are_always_reachable() {
        assert_eq!(Route::parse("/register").guard(false), Route::Register);
        assert_eq!(Route::parse("/login").guard(true), Route::Login);
        assert_eq!(
            Route::parse("/reset-password/t").guard(true),
            Route::ResetPassword("t".into())
        );
    }

    #[test]
    fn unknown_paths_depend_on_session() {
        assert_eq!(Route::parse("/nope").guard(true), Route::Home);
        assert_eq!(Route::parse("/nope").guard(false), Route::Login);
        assert_eq!(Route::parse("/playlist").guard(true), Route::Home);
    }
}
