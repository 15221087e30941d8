// File: src/dispatch/reduce.rs
// Purpose: Reduce an action's return value to a render decision

use crate::controller::{ActionContext, ActionReturn};
use crate::error::{DispatchError, DispatchResult};
use crate::model::{Model, ModelAndView};

use super::{DispatchOutcome, NoRenderReason};

/// Single-step decision table, checked top to bottom:
///
/// 1. `render_view == false` renders nothing
/// 2. an explicit [`ActionContext::model_and_view`] is returned verbatim
/// 3. no return value renders the declared view with the handler's properties over
///    the chain model, or nothing without a declared view
/// 4. a returned model renders the declared view with the model over the chain model
/// 5. a returned render instruction gets missing chain entries and, when it has no
///    view, the declared view name
/// 6. any other value renders the handler's properties over the chain model, even
///    without a declared view
pub(crate) fn reduce_action_return(
    ctx: &mut ActionContext<'_>,
    returned: ActionReturn,
    view_name: &str,
) -> DispatchResult<DispatchOutcome> {
    if !ctx.render_view {
        return Ok(DispatchOutcome::NoRender(NoRenderReason::RenderViewDisabled));
    }

    if let Some(explicit) = ctx.model_and_view.take() {
        return Ok(DispatchOutcome::Render(explicit));
    }

    let view_name_blank = view_name.trim().is_empty();

    match returned {
        ActionReturn::None => {
            if view_name_blank {
                return Ok(DispatchOutcome::NoRender(NoRenderReason::NoView));
            }
            let model = ctx.properties.clone().layered_over(&ctx.chain_model);
            Ok(DispatchOutcome::Render(ModelAndView::new(view_name, model)))
        }
        ActionReturn::Object(_) => {
            let model = ctx.properties.clone().layered_over(&ctx.chain_model);
            Ok(DispatchOutcome::Render(instruction(view_name, model)))
        }
        ActionReturn::Model(mut model) => {
            model.unwrap_proxies();
            let model = model.layered_over(&ctx.chain_model);
            Ok(DispatchOutcome::Render(instruction(view_name, model)))
        }
        ActionReturn::View(mut mv) => {
            mv.model_mut().unwrap_proxies();
            mv.model_mut().add_missing(&ctx.chain_model);

            if mv.lacks_view() {
                if view_name_blank {
                    return Err(DispatchError::MissingViewName {
                        controller: ctx.controller_name.clone(),
                        action: ctx.action_name.clone(),
                    });
                }
                mv.set_view_name(view_name);
            }
            Ok(DispatchOutcome::Render(mv))
        }
    }
}

fn instruction(view_name: &str, model: Model) -> ModelAndView {
    if view_name.trim().is_empty() {
        ModelAndView::from_model(model)
    } else {
        ModelAndView::new(view_name, model)
    }
}
