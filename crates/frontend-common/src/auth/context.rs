//! Session provider and hooks

use crate::client::create_session_context;
use placer_http::{ApiGateway, IdentityClaims, SessionContext, SessionError, SessionState};
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// What components see of the session: the shared context plus the latest state
#[derive(Clone)]
pub struct SessionHandle {
    context: Rc<SessionContext>,
    state: SessionState,
}

impl PartialEq for SessionHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.context, &other.context) && self.state == other.state
    }
}

impl SessionHandle {
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn identity(&self) -> Option<&IdentityClaims> {
        self.state.identity.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// Gateway for authenticated API calls
    #[must_use]
    pub fn gateway(&self) -> ApiGateway {
        self.context.gateway()
    }

    #[must_use]
    pub fn context(&self) -> Rc<SessionContext> {
        self.context.clone()
    }

    /// Sign in in the background; `on_done` receives the outcome for display
    pub fn sign_in(
        &self,
        email: String,
        password: String,
        on_done: Callback<Result<IdentityClaims, SessionError>>,
    ) {
        let context = self.context.clone();
        spawn_local(async move {
            on_done.emit(context.sign_in(&email, &password).await);
        });
    }

    /// Register and sign in in the background
    pub fn sign_up(
        &self,
        email: String,
        name: String,
        password: String,
        on_done: Callback<Result<IdentityClaims, SessionError>>,
    ) {
        let context = self.context.clone();
        spawn_local(async move {
            on_done.emit(context.sign_up(&email, &name, &password).await);
        });
    }

    /// Sign out in the background; the app is sent to the sign-in route afterwards
    pub fn sign_out(&self) {
        let context = self.context.clone();
        spawn_local(async move {
            context.sign_out().await;
        });
    }
}

/// Session provider props
#[derive(Properties, PartialEq)]
pub struct SessionProviderProps {
    pub children: Children,
}

/// Session provider component
#[function_component(SessionProvider)]
pub fn session_provider(props: &SessionProviderProps) -> Html {
    let context = use_memo((), |_| {
        create_session_context()
            .map(Rc::new)
            .map_err(|e| e.to_string())
    });
    let state = use_state(SessionState::unknown);

    // Mirror context state into the component and bootstrap once on mount
    {
        let context = context.clone();
        let state = state.clone();
        use_effect_with((), move |_| {
            if let Ok(context) = &*context {
                let mut updates = context.subscribe();
                spawn_local(async move {
                    while updates.changed().await.is_ok() {
                        let next = updates.borrow_and_update().clone();
                        state.set(next);
                    }
                });

                let context = context.clone();
                spawn_local(async move {
                    context.bootstrap().await;
                });
            }
        });
    }

    match &*context {
        Ok(context) => {
            let handle = SessionHandle {
                context: context.clone(),
                state: (*state).clone(),
            };
            html! {
                <ContextProvider<SessionHandle> context={handle}>
                    {props.children.clone()}
                </ContextProvider<SessionHandle>>
            }
        }
        Err(error) => {
            tracing::error!("Session client could not be configured: {}", error);
            html! {
                <div class="p-6 text-red-600">
                    {"Unable to reach the Placer service. Please reload the page."}
                </div>
            }
        }
    }
}

/// Hook to use the session
#[hook]
pub fn use_session() -> SessionHandle {
    use_context::<SessionHandle>()
        .expect("SessionHandle not found. Make sure to wrap your component with SessionProvider")
}

/// Hook to get the current session state
#[hook]
pub fn use_session_state() -> SessionState {
    use_session().state().clone()
}

/// Hook to get the signed-in identity
#[hook]
pub fn use_identity() -> Option<IdentityClaims> {
    use_session().identity().cloned()
}

/// Hook to check if authenticated
#[hook]
pub fn use_is_authenticated() -> bool {
    use_session().is_authenticated()
}
