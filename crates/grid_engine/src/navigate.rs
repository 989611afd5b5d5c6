use std::cell::RefCell;

use engine_logging::{engine_debug, engine_info, engine_warn};
use grid_core::{JobSpec, NavigationContext};
use url::Url;

use crate::config::EngineConfig;
use crate::page::Page;
use crate::poll::poll_until;
use crate::router::detect_router;

/// Route path for a job, e.g. `/stock/financials`.
pub fn route_path(prefix: &str, job: &JobSpec) -> String {
    format!("{}{}", prefix, job.section.path_segment())
}

pub fn route_query(job: &JobSpec, ctx: &NavigationContext) -> Vec<(String, String)> {
    vec![
        ("cid".to_string(), ctx.entity_id.clone()),
        ("tid".to_string(), ctx.ticker_internal_id.clone()),
        ("tab".to_string(), job.view_tab.to_string()),
        ("ref".to_string(), ctx.referral_code.clone()),
    ]
}

/// Absolute address of the job's view on the same origin as `current`.
pub fn target_address(current: &Url, prefix: &str, job: &JobSpec, ctx: &NavigationContext) -> Url {
    let mut target = current.clone();
    target.set_fragment(None);
    target.set_path(&route_path(prefix, job));
    target
        .query_pairs_mut()
        .clear()
        .extend_pairs(route_query(job, ctx));
    target
}

/// Same origin and path, and the same decoded query pairs in any order.
///
/// Routers serialize queries in their own key order and percent-encoding, so
/// the raw address strings are not comparable.
pub fn is_same_view(current: &Url, target: &Url) -> bool {
    current.origin() == target.origin()
        && current.path() == target.path()
        && sorted_pairs(current) == sorted_pairs(target)
}

fn sorted_pairs(url: &Url) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    pairs.sort();
    pairs
}

fn is_at(address: &str, target: &Url) -> bool {
    Url::parse(address).is_ok_and(|current| is_same_view(&current, target))
}

/// Moves the page to the job's view. Returns `false` if the address was not
/// reached within the navigation profile; never errors.
///
/// Already being at the target is a no-op, so repeated calls never reload.
pub async fn navigate_to(
    page: &dyn Page,
    job: &JobSpec,
    ctx: &NavigationContext,
    config: &EngineConfig,
) -> bool {
    let current = match page.current_url().await {
        Ok(address) => address,
        Err(err) => {
            engine_warn!("navigate {}: cannot read current address: {}", job.id, err);
            return false;
        }
    };
    let Ok(current_url) = Url::parse(&current) else {
        engine_warn!("navigate {}: current address is not a url: {}", job.id, current);
        return false;
    };
    let target = target_address(&current_url, &config.route_prefix, job, ctx);
    engine_info!("navigate {} begin from={} target={}", job.id, current, target);

    if is_at(&current, &target) {
        engine_info!("navigate {} skipped, already at target", job.id);
        return true;
    }

    let path = route_path(&config.route_prefix, job);
    let query = route_query(job, ctx);
    let pushed = match detect_router(page, &config.router_attachments).await {
        Some(router) => {
            engine_debug!(
                "router {} current={:?}",
                router.name(),
                router.current_path()
            );
            match router.push(&path, &query).await {
                Ok(()) => true,
                Err(err) => {
                    engine_warn!("router push threw, falling back to hard navigation: {}", err);
                    false
                }
            }
        }
        None => {
            engine_warn!("router not found, falling back to hard navigation");
            false
        }
    };

    if !pushed {
        if let Err(err) = page.assign_location(target.as_str()).await {
            engine_warn!("hard navigation to {} failed: {}", target, err);
            return false;
        }
    }

    let last_seen = RefCell::new(current);
    let (target_ref, last_seen_ref) = (&target, &last_seen);
    let arrived = poll_until(config.navigation_poll, || async move {
        let address = page.current_url().await.ok()?;
        if *last_seen_ref.borrow() != address {
            engine_debug!("navigate progress href={}", address);
            last_seen_ref.replace(address.clone());
        }
        is_at(&address, target_ref).then_some(())
    })
    .await
    .is_some();

    if arrived {
        engine_info!("navigate {} done", job.id);
    } else {
        engine_warn!("navigate {} timed out, target={}", job.id, target);
    }
    arrived
}
