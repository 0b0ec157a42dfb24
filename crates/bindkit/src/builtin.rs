//! Actions provided by the built-in node types.
use futures::future::{FutureExt, LocalBoxFuture};

use crate::action::ActionCall;
use crate::app::App;
use crate::errors::ActionResult;

pub(crate) fn quit<S: 'static>(
    app: &mut App<S>,
    _: ActionCall,
) -> LocalBoxFuture<'_, ActionResult> {
    async move {
        app.exit();

        Ok(())
    }
    .boxed_local()
}

pub(crate) fn bell<S: 'static>(
    app: &mut App<S>,
    _: ActionCall,
) -> LocalBoxFuture<'_, ActionResult> {
    async move {
        app.bell();

        Ok(())
    }
    .boxed_local()
}

pub(crate) fn push_screen<S: 'static>(
    app: &mut App<S>,
    call: ActionCall,
) -> LocalBoxFuture<'_, ActionResult> {
    async move {
        let name = call.str_arg(0)?;
        app.push_named_screen(name)?;

        Ok(())
    }
    .boxed_local()
}

pub(crate) fn pop_screen<S: 'static>(
    app: &mut App<S>,
    _: ActionCall,
) -> LocalBoxFuture<'_, ActionResult> {
    async move {
        app.pop_screen()?;

        Ok(())
    }
    .boxed_local()
}

pub(crate) fn focus_next<S: 'static>(
    app: &mut App<S>,
    _: ActionCall,
) -> LocalBoxFuture<'_, ActionResult> {
    async move {
        app.focus_next();

        Ok(())
    }
    .boxed_local()
}

pub(crate) fn focus_previous<S: 'static>(
    app: &mut App<S>,
    _: ActionCall,
) -> LocalBoxFuture<'_, ActionResult> {
    async move {
        app.focus_previous();

        Ok(())
    }
    .boxed_local()
}
