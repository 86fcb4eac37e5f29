//! 资源查询缓存
//!
//! 每种资源一个槽位，槽位在 TTL 内视为新鲜。
//! 同一资源的并发查询合并为一次进行中的请求，所有调用者共享结果。
//! 失效只由调用方显式触发，查询失败时清空对应槽位，不保留旧数据。

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use olvm_client::{Cluster, Host, Result, Vm};
use tokio::time::Instant;
use tracing::{debug, warn};

/// 默认缓存过期时间 = 30 秒
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// 资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Vms,
    Clusters,
    Hosts,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Vms, ResourceKind::Clusters, ResourceKind::Hosts];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Vms => "vms",
            ResourceKind::Clusters => "clusters",
            ResourceKind::Hosts => "hosts",
        }
    }
}

type PendingFetch<T> = Shared<BoxFuture<'static, Result<Arc<Vec<T>>>>>;

/// 单个缓存槽位
#[doc(hidden)]
pub struct Slot<T> {
    entry: Option<(Instant, Arc<Vec<T>>)>,
    /// 进行中的查询
    pending: Option<PendingFetch<T>>,
    /// 每次失效递增，旧代次的查询结果不再写回
    generation: u64,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            entry: None,
            pending: None,
            generation: 0,
        }
    }
}

impl<T> Slot<T> {
    fn fresh(&self, ttl: Duration) -> Option<Arc<Vec<T>>> {
        match &self.entry {
            Some((fetched_at, items)) if fetched_at.elapsed() < ttl => Some(Arc::clone(items)),
            _ => None,
        }
    }

    fn reset(&mut self) {
        self.entry = None;
        self.pending = None;
        self.generation += 1;
    }
}

type SlotRef<T> = Arc<Mutex<Slot<T>>>;

/// 可缓存的资源
pub trait Cached: Sized + Send + Sync + 'static {
    const KIND: ResourceKind;

    #[doc(hidden)]
    fn slot(cache: &ResourceCache) -> &SlotRef<Self>;
}

impl Cached for Vm {
    const KIND: ResourceKind = ResourceKind::Vms;

    fn slot(cache: &ResourceCache) -> &SlotRef<Self> {
        &cache.vms
    }
}

impl Cached for Cluster {
    const KIND: ResourceKind = ResourceKind::Clusters;

    fn slot(cache: &ResourceCache) -> &SlotRef<Self> {
        &cache.clusters
    }
}

impl Cached for Host {
    const KIND: ResourceKind = ResourceKind::Hosts;

    fn slot(cache: &ResourceCache) -> &SlotRef<Self> {
        &cache.hosts
    }
}

/// 内存资源缓存
pub struct ResourceCache {
    ttl: Duration,
    vms: SlotRef<Vm>,
    clusters: SlotRef<Cluster>,
    hosts: SlotRef<Host>,
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }
}

impl ResourceCache {
    /// 创建带自定义 TTL 的缓存
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            vms: Arc::default(),
            clusters: Arc::default(),
            hosts: Arc::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 读取新鲜的缓存项
    pub fn get<T: Cached>(&self) -> Option<Arc<Vec<T>>> {
        let items = lock(T::slot(self)).fresh(self.ttl);
        if items.is_some() {
            debug!("缓存命中: {}", T::KIND.as_str());
        }
        items
    }

    /// 读取缓存，未命中时发起 (或加入) 查询
    ///
    /// `fetch` 只在需要发起新查询时调用。查询成功写入槽位，失败清空槽位；
    /// 查询期间槽位被失效时，结果只返回给等待者，不写回。
    pub async fn get_or_fetch<T, F, Fut>(&self, fetch: F) -> Result<Arc<Vec<T>>>
    where
        T: Cached,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
    {
        let pending = {
            let mut slot = lock(T::slot(self));

            if let Some(items) = slot.fresh(self.ttl) {
                debug!("缓存命中: {}", T::KIND.as_str());
                return Ok(items);
            }

            match &slot.pending {
                Some(pending) => {
                    debug!("加入进行中的查询: {}", T::KIND.as_str());
                    pending.clone()
                }
                None => {
                    let pending = start_fetch(Arc::clone(T::slot(self)), slot.generation, fetch());
                    slot.pending = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// 写入缓存项
    pub fn store<T: Cached>(&self, items: Arc<Vec<T>>) {
        lock(T::slot(self)).entry = Some((Instant::now(), items));
    }

    /// 清空某种资源的缓存项，并丢弃进行中的查询
    pub fn clear<T: Cached>(&self) {
        lock(T::slot(self)).reset();
    }

    /// 显式失效
    pub fn invalidate(&self, kind: ResourceKind) {
        debug!("缓存失效: {}", kind.as_str());
        match kind {
            ResourceKind::Vms => self.clear::<Vm>(),
            ResourceKind::Clusters => self.clear::<Cluster>(),
            ResourceKind::Hosts => self.clear::<Host>(),
        }
    }

    pub fn invalidate_all(&self) {
        for kind in ResourceKind::ALL {
            self.invalidate(kind);
        }
    }
}

fn start_fetch<T, Fut>(slot: SlotRef<T>, generation: u64, fetch: Fut) -> PendingFetch<T>
where
    T: Cached,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    async move {
        debug!("查询资源: {}", T::KIND.as_str());
        let result = fetch.await.map(Arc::new);
        if let Err(e) = &result {
            warn!("查询 {} 失败: {}", T::KIND.as_str(), e);
        }

        {
            let mut slot = lock(&slot);
            if slot.generation == generation {
                slot.pending = None;
                slot.entry = match &result {
                    Ok(items) => Some((Instant::now(), Arc::clone(items))),
                    Err(_) => None,
                };
            } else {
                debug!("查询期间缓存已失效，结果不写回: {}", T::KIND.as_str());
            }
        }

        result
    }
    .boxed()
    .shared()
}

fn lock<T>(slot: &Mutex<Slot<T>>) -> MutexGuard<'_, Slot<T>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
