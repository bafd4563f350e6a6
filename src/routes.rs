use yew_router::prelude::*;

#[derive(Clone, Routable, PartialEq, Debug)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/login")]
    Login,
    #[at("/chat/:id")]
    Chat { id: String },
    #[not_found]
    #[at("/404")]
    NotFound,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Access {
    Render,
    Redirect(Route),
}

/// Capability check consulted before a view is rendered.
pub fn guard(route: &Route, authenticated: bool) -> Access {
    match route {
        Route::Home | Route::Chat { .. } if !authenticated => Access::Redirect(Route::Login),
        Route::Login if authenticated => Access::Redirect(Route::Home),
        _ => Access::Render,
    }
}
