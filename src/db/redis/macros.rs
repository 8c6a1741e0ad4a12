/// Read-through caching on top of [`Cache`](crate::db::Cache).
///
/// Returns the cached value when present. Otherwise awaits `$block`, queues the
/// result for a background write with the given TTL, and returns it. A failed cache
/// read is logged and treated as a miss, so an unreachable Redis only costs the
/// round trip to the source. Errors from `$block` are propagated with `?`, so the
/// macro can only be used inside a function returning `AppResult`.
///
/// # Arguments
/// * `$cache`: A `Cache` (or reference to one).
/// * `$key`: The `CacheKey` to read and write.
/// * `$ttl`: Time-to-live in seconds for a freshly computed value.
/// * `$block`: A future producing `AppResult<T>` on a miss.
///
/// # Example
/// ```rust,ignore
/// let key = CacheKey::Recommendations(user_id.clone());
/// cached!(cache, key, 3600, load_recommendations(user_id))
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let cached = match $cache.get_from_cache(&$key).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(error = %e, key = %$key, "Cache read failed, loading from source");
                None
            }
        };

        if let Some(cached) = cached {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
