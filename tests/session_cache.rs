//! 会话缓存集成测试
//!
//! 覆盖缓存命中、并发刷新、批量载入和持久化往返

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use translax::translation::core::engine::EngineName;
use translax::translation::core::registry::EngineRegistry;
use translax::translation::error::TranslationError;
use translax::translation::storage::cache::SessionCache;
use translax::translation::storage::session::Cookie;
use translax::translation::storage::store::{MemorySessionStore, SessionStore};

mod common {
    include!("common/mod.rs");
}

use common::{two_cookie_session, StubTranslator, TestEnvironment};

fn cache_for(stubs: &[Arc<StubTranslator>], store: Arc<dyn SessionStore>) -> SessionCache {
    let mut registry = EngineRegistry::new();
    for stub in stubs {
        registry.register(stub.clone());
    }
    SessionCache::new(Arc::new(registry), store)
}

/// 测试连续两次获取返回同一个会话且只刷新一次
#[test]
fn test_repeated_lookup_returns_same_session() {
    let stub = Arc::new(StubTranslator::new(EngineName::Bing));
    let cache = cache_for(&[stub.clone()], Arc::new(MemorySessionStore::new()));

    let first = cache.get_session(EngineName::Bing).unwrap();
    let second = cache.get_session(EngineName::Bing).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(stub.acquire_count(), 1);
    assert_eq!(cache.stats().hit_rate(), 0.5);

    println!("✅ Repeated lookup test passed");
}

/// 测试未注册引擎返回 NoTranslator
#[test]
fn test_unregistered_engine_is_an_error() {
    let stub = Arc::new(StubTranslator::new(EngineName::Google));
    let cache = cache_for(&[stub.clone()], Arc::new(MemorySessionStore::new()));

    for _ in 0..3 {
        let err = cache.get_session(EngineName::Baidu).unwrap_err();
        assert!(matches!(err, TranslationError::NoTranslator(EngineName::Baidu)));
    }
    assert_eq!(stub.acquire_count(), 0);
    assert!(cache.peek(EngineName::Baidu).is_none());

    println!("✅ Unregistered engine test passed");
}

/// 测试空缓存上的并发获取只触发一次刷新
#[test]
fn test_concurrent_misses_refresh_once() {
    const THREADS: usize = 16;

    let stub = Arc::new(
        StubTranslator::new(EngineName::Youdao).with_delay(Duration::from_millis(50)),
    );
    let cache = Arc::new(cache_for(&[stub.clone()], Arc::new(MemorySessionStore::new())));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                cache.get_session(EngineName::Youdao)
            })
        })
        .collect();

    let sessions: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread panicked").unwrap())
        .collect();

    assert_eq!(stub.acquire_count(), 1);
    assert!(sessions.iter().all(|s| Arc::ptr_eq(s, &sessions[0])));
    // 每次调用恰好计一次命中或未命中
    let stats = cache.stats();
    assert_eq!(stats.refreshes, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, THREADS as u64 - 1);

    println!("✅ Concurrent refresh test passed - {} threads, 1 refresh", THREADS);
}

/// 测试不同引擎的刷新互不阻塞
#[test]
fn test_engines_refresh_independently() {
    let slow = Arc::new(StubTranslator::new(EngineName::Baidu).with_delay(Duration::from_millis(300)));
    let fast = Arc::new(StubTranslator::new(EngineName::Bing));
    let cache = Arc::new(cache_for(
        &[slow.clone(), fast.clone()],
        Arc::new(MemorySessionStore::new()),
    ));

    let slow_cache = Arc::clone(&cache);
    let handle = thread::spawn(move || slow_cache.get_session(EngineName::Baidu));

    thread::sleep(Duration::from_millis(20));
    let start = std::time::Instant::now();
    cache.get_session(EngineName::Bing).unwrap();
    assert!(start.elapsed() < Duration::from_millis(250));

    handle.join().expect("thread panicked").unwrap();
    assert_eq!(cache.engines(), vec![EngineName::Baidu, EngineName::Bing]);

    println!("✅ Independent engine refresh test passed");
}

/// 测试五个引擎中一个会话文件损坏时批量载入仍然成功
#[test]
fn test_bulk_load_skips_corrupt_file() {
    let env = TestEnvironment::new();
    let store = env.store();

    let stubs: Vec<_> = EngineName::ALL
        .into_iter()
        .map(|engine| Arc::new(StubTranslator::new(engine)))
        .collect();

    for engine in EngineName::ALL {
        if engine == EngineName::Sougou {
            env.write_raw(engine, "expr_at: {{{ not yaml");
        } else {
            store
                .save(engine, Some(&two_cookie_session()))
                .expect("save should succeed");
        }
    }

    let cache = cache_for(&stubs, store);
    let report = cache.load_all();

    assert_eq!(report.loaded.len(), 4);
    assert_eq!(report.skipped.len(), 1);
    assert!(matches!(
        report.skipped[0],
        (EngineName::Sougou, TranslationError::CorruptSession { .. })
    ));
    assert_eq!(cache.len(), 4);
    assert!(cache.peek(EngineName::Sougou).is_none());

    // 损坏的引擎在首次使用时刷新
    let session = cache.get_session(EngineName::Sougou).unwrap();
    assert_eq!(session.cookies[0].name, "sid");
    assert_eq!(stubs.iter().map(|s| s.acquire_count()).sum::<usize>(), 1);

    println!("✅ Bulk load test passed - {:?} loaded", report.loaded);
}

/// 测试刷新得到的会话经持久化后可以原样读回
#[test]
fn test_refreshed_session_round_trips_through_disk() {
    let env = TestEnvironment::new();
    let cookies = vec![
        Cookie::parse_set_cookie("SNUID=7A9B; path=/; domain=.sogou.com").unwrap(),
        Cookie::new("SUV", "0042"),
    ];
    let stub = Arc::new(
        StubTranslator::new(EngineName::Sougou)
            .with_cookies(cookies.clone())
            .with_expiry(1_900_000_000),
    );

    let cache = cache_for(&[stub.clone()], env.store());
    let session = cache.get_session(EngineName::Sougou).unwrap();
    assert_eq!(session.cookies, cookies);
    assert!(env.file_exists(EngineName::Sougou));

    // 模拟进程重启
    let restarted = cache_for(&[stub.clone()], env.store());
    assert_eq!(restarted.load_all().loaded, vec![EngineName::Sougou]);

    let reloaded = restarted.get_session(EngineName::Sougou).unwrap();
    assert_eq!(reloaded.cookies, cookies);
    assert_eq!(reloaded.expires_at, 1_900_000_000);
    assert_eq!(stub.acquire_count(), 1);

    println!("✅ Disk round trip test passed");
}

/// 测试过期会话在命中时被刷新并重新持久化
#[test]
fn test_expired_session_on_disk_is_replaced() {
    let env = TestEnvironment::new();
    env.write_raw(
        EngineName::Google,
        "expr_at: 1000\ncookies:\n  - name: NID\n    value: stale\n",
    );
    let stub = Arc::new(StubTranslator::new(EngineName::Google));

    let cache = cache_for(&[stub.clone()], env.store());
    cache.load_all();

    let session = cache.get_session(EngineName::Google).unwrap();
    assert_eq!(session.cookies[0].name, "sid");
    assert_eq!(stub.acquire_count(), 1);
    assert_eq!(cache.stats().expired, 1);

    let on_disk = env.store().load(EngineName::Google).unwrap();
    assert_eq!(on_disk.cookies[0].name, "sid");

    println!("✅ Expired session replacement test passed");
}

/// 测试会话目录不可写时刷新结果仍然可用
#[test]
fn test_unwritable_session_dir_does_not_fail_lookup() {
    let env = TestEnvironment::new();
    // 会话目录的位置被一个普通文件占用
    std::fs::write(env.session_dir(), "not a directory").unwrap();

    let stub = Arc::new(StubTranslator::new(EngineName::Bing));
    let cache = cache_for(&[stub.clone()], env.store());

    let session = cache.get_session(EngineName::Bing).unwrap();
    assert_eq!(session.cookies.len(), 1);
    assert_eq!(cache.stats().persist_failures, 1);

    // 内存副本继续生效
    cache.get_session(EngineName::Bing).unwrap();
    assert_eq!(stub.acquire_count(), 1);

    println!("✅ Persist failure test passed");
}
