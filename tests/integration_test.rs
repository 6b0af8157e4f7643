//! 需要真实浏览器的集成测试
//!
//! 默认忽略，需要手动运行：cargo test -- --ignored
//! （要求本机可以启动 Chromium 系浏览器；附加测试还要求
//! 浏览器已用 --remote-debugging-port 启动）

use grade_summary_overlay::services::PageObserver;
use grade_summary_overlay::utils::logging;
use grade_summary_overlay::{
    connect_to_browser_and_page, launch_headless_browser, Config, JsExecutor, RefreshCtx,
    RefreshFlow, RefreshOutcome, Trigger,
};

/// 构造一个符合宿主页面布局的成绩页 data: URL
///
/// 每行 11 个单元格，第 7 列学分、第 10 列成绩，外加一个折叠开关
fn fixture_page(rows: &[(&str, &str)]) -> String {
    let mut items = String::new();
    for (credits, grade) in rows {
        let mut cells = String::new();
        for i in 0..11 {
            let text = match i {
                7 => (*credits).to_string(),
                10 => (*grade).to_string(),
                _ => format!("c{}", i),
            };
            cells.push_str(&format!("<td>{}</td>", text));
        }
        items.push_str(&format!("<tr class='leistung-item'>{}</tr>", cells));
    }

    let html = format!(
        "<html><body>\
         <button class='Accordion__Toggle' aria-expanded='false'>SS 2025</button>\
         <div><table class='leistung-table'>{}</table></div>\
         </body></html>",
        items
    );

    // data: URL 里的空格需要转义
    format!("data:text/html,{}", html.replace(' ', "%20"))
}

#[tokio::test]
#[ignore]
async fn test_browser_connection() {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 测试浏览器连接
    let result = connect_to_browser_and_page(
        config.browser_debug_port,
        Some(&config.target_url),
        config.target_title.as_deref(),
    )
    .await;

    assert!(result.is_ok(), "应该能够成功连接浏览器");
}

#[tokio::test]
#[ignore]
async fn test_full_pass_creates_then_updates_widget() {
    logging::init();

    let url = fixture_page(&[("5", "2"), ("10", "1"), ("4", "5")]);
    let (_browser, page) = launch_headless_browser(&url, None)
        .await
        .expect("启动无头浏览器失败");

    let executor = JsExecutor::new(page);
    let config = Config::default();
    let flow = RefreshFlow::new(&config);

    // 第一次重算：创建挂件
    let outcome = flow
        .run(&executor, &RefreshCtx::new(1, Trigger::Startup))
        .await
        .expect("重算失败");

    match outcome {
        RefreshOutcome::Rendered { ref stats, created } => {
            assert!(created, "首次重算应该创建挂件");
            assert_eq!(stats.total_credits, 15.0);
            assert_eq!(stats.weighted_average, 1.33);
            assert_eq!(stats.gpa, 3.67);
            assert_eq!(stats.course_count, 2);
            assert_eq!(stats.failed_count, 1);
        }
        other => panic!("预期 Rendered，实际: {:?}", other),
    }

    // 第二次重算：幂等，原地更新，不产生第二个挂件
    let outcome = flow
        .run(&executor, &RefreshCtx::new(2, Trigger::Toggle))
        .await
        .expect("重算失败");
    assert!(
        matches!(outcome, RefreshOutcome::Rendered { created: false, .. }),
        "重复重算应该是原地更新"
    );

    let container_count: u64 = executor
        .eval_as("document.querySelectorAll('.result-container').length")
        .await
        .expect("查询挂件数量失败");
    assert_eq!(container_count, 1, "页面上只能有一个挂件");

    // 挂件插在表格前面，字段按标识更新
    let average: String = executor
        .eval_as("document.querySelector('[data-field=\"average\"]').textContent")
        .await
        .expect("读取字段失败");
    assert_eq!(average, "1.33");

    let is_before_table: bool = executor
        .eval_as(
            "document.querySelector('.result-container').nextElementSibling.contains(\
             document.querySelector('.leistung-table'))",
        )
        .await
        .expect("检查挂件位置失败");
    assert!(is_before_table, "挂件应该紧挨在表格之前");
}

#[tokio::test]
#[ignore]
async fn test_empty_table_renders_nothing() {
    logging::init();

    let url = fixture_page(&[]);
    let (_browser, page) = launch_headless_browser(&url, None)
        .await
        .expect("启动无头浏览器失败");

    let executor = JsExecutor::new(page);
    let config = Config::default();
    let flow = RefreshFlow::new(&config);

    let outcome = flow
        .run(&executor, &RefreshCtx::new(1, Trigger::Startup))
        .await
        .expect("重算失败");
    assert_eq!(outcome, RefreshOutcome::NoData);

    let container_count: u64 = executor
        .eval_as("document.querySelectorAll('.result-container').length")
        .await
        .expect("查询挂件数量失败");
    assert_eq!(container_count, 0, "没有有效数据时不应该创建挂件");
}

#[tokio::test]
#[ignore]
async fn test_observer_signals_on_toggle() {
    logging::init();

    let url = fixture_page(&[("5", "1")]);
    let (_browser, page) = launch_headless_browser(&url, None)
        .await
        .expect("启动无头浏览器失败");

    let executor = JsExecutor::new(page);
    let observer = PageObserver::new(Config::default().selectors);

    observer
        .install_presence_watch(&executor)
        .await
        .expect("安装广域观察器失败");
    assert!(observer.table_present(&executor).await.expect("探测失败"));

    // 切换到跟踪阶段：fixture 里有一个折叠开关
    let toggles = observer
        .switch_to_change_watch(&executor)
        .await
        .expect("切换跟踪阶段失败");
    assert_eq!(toggles, 1);

    // 清空切换前可能积累的信号
    let _ = observer.drain_signals(&executor).await.expect("取信号失败");

    // 模拟折叠开关的展开状态变化
    executor
        .eval("document.querySelector('.Accordion__Toggle').setAttribute('aria-expanded', 'true')")
        .await
        .expect("修改属性失败");
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    let signals = observer.drain_signals(&executor).await.expect("取信号失败");
    assert!(!signals.is_empty(), "属性变化应该产生 toggle 信号");

    // 队列已清空
    let signals = observer.drain_signals(&executor).await.expect("取信号失败");
    assert!(signals.is_empty());
}
