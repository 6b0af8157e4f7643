//! 页面观察服务 - 业务能力层
//!
//! 只负责"感知页面变化"能力：在页面侧安装/切换观察器、取回积累的信号。
//! 不关心信号之后如何触发重算，也不认识成绩数据。
//!
//! 观察分两个阶段（探测 → 跟踪），页面侧的状态都挂在
//! `window.__gradeWatch` 上：
//! - 探测阶段：document.body 上的一个广域 MutationObserver
//!   （childList + subtree），任何节点增删都会入队一条 structure 信号
//! - 跟踪阶段：广域观察器断开，改为每个折叠开关上的属性观察器
//!   （只看展开状态属性）加一个委托的点击监听，入队 toggle 信号

use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::Selectors;
use crate::error::{AppError, AppResult};
use crate::infrastructure::JsExecutor;

/// 折叠开关的展开状态属性
const EXPANDED_ATTR: &str = "aria-expanded";

/// 页面变化信号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
}

/// 信号类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// 节点增删（探测阶段的广域观察器）
    Structure,
    /// 折叠开关交互（属性变化或点击）
    Toggle,
}

/// 安装探测阶段广域观察器的脚本
const PRESENCE_WATCH_JS: &str = r#"
(() => {
    try {
        const w = (window.__gradeWatch =
            window.__gradeWatch || { queue: [], broad: null, narrow: [], clickBound: false });
        if (w.broad) {
            return 'already';
        }
        w.broad = new MutationObserver((mutations) => {
            for (const m of mutations) {
                if (m.addedNodes.length || m.removedNodes.length) {
                    w.queue.push({ kind: 'structure' });
                    break;
                }
            }
        });
        w.broad.observe(document.body, { childList: true, subtree: true });
        return 'installed';
    } catch (e) {
        return 'error: ' + e.message;
    }
})()
"#;

/// 取走并清空信号队列的脚本
const DRAIN_JS: &str = r#"
(() => {
    const w = window.__gradeWatch;
    if (!w) {
        return [];
    }
    const q = w.queue;
    w.queue = [];
    return q;
})()
"#;

/// 页面观察服务
///
/// 职责：
/// - 在页面侧安装/切换/拆除观察器
/// - 取回积累的变化信号
/// - 探测成绩表格是否存在
pub struct PageObserver {
    selectors: Selectors,
}

impl PageObserver {
    pub fn new(selectors: Selectors) -> Self {
        Self { selectors }
    }

    /// 安装探测阶段的广域观察器
    ///
    /// 幂等：已安装时不重复安装
    pub async fn install_presence_watch(&self, executor: &JsExecutor) -> AppResult<()> {
        let status = executor.eval(PRESENCE_WATCH_JS).await?;
        expect_ok(&status)?;
        debug!("广域观察器已安装: {}", status);
        Ok(())
    }

    /// 从探测阶段切换到跟踪阶段
    ///
    /// 断开广域观察器，在当前存在的每个折叠开关上挂属性观察器，
    /// 并绑定一次性的委托点击监听；返回挂载的开关数量
    // TODO: 跟踪阶段中宿主重渲染折叠区域时新出现的开关不会被挂上
    // 属性观察器（委托点击监听不受影响），需要在信号量持续为零时重挂
    pub async fn switch_to_change_watch(&self, executor: &JsExecutor) -> AppResult<u64> {
        let js = format!(
            r#"
            (() => {{
                try {{
                    const w = window.__gradeWatch;
                    if (!w) {{
                        return 'error: watch state missing';
                    }}
                    if (w.broad) {{
                        w.broad.disconnect();
                        w.broad = null;
                    }}
                    for (const o of w.narrow) {{
                        o.disconnect();
                    }}
                    w.narrow = [];
                    const toggles = document.querySelectorAll({toggle});
                    for (const t of toggles) {{
                        const o = new MutationObserver((mutations) => {{
                            for (const m of mutations) {{
                                if (m.type === 'attributes' && m.attributeName === {attr}) {{
                                    w.queue.push({{ kind: 'toggle' }});
                                    break;
                                }}
                            }}
                        }});
                        o.observe(t, {{ attributes: true }});
                        w.narrow.push(o);
                    }}
                    if (!w.clickBound) {{
                        document.body.addEventListener('click', (event) => {{
                            if (event.target.closest && event.target.closest({toggle})) {{
                                w.queue.push({{ kind: 'toggle' }});
                            }}
                        }});
                        w.clickBound = true;
                    }}
                    return toggles.length;
                }} catch (e) {{
                    return 'error: ' + e.message;
                }}
            }})()
            "#,
            toggle = serde_json::to_string(&self.selectors.toggle)?,
            attr = serde_json::to_string(EXPANDED_ATTR)?,
        );

        let result = executor.eval(js).await?;
        match result.as_u64() {
            Some(count) => {
                debug!("已切换到跟踪阶段, 挂载 {} 个开关观察器", count);
                Ok(count)
            }
            None => Err(page_error(&result)),
        }
    }

    /// 回到探测阶段
    ///
    /// 表格被宿主页面整体移除后调用：拆掉开关观察器，重新开始广域探测
    pub async fn restore_presence_watch(&self, executor: &JsExecutor) -> AppResult<()> {
        let teardown = r#"
            (() => {
                try {
                    const w = window.__gradeWatch;
                    if (!w) {
                        return 'ok';
                    }
                    for (const o of w.narrow) {
                        o.disconnect();
                    }
                    w.narrow = [];
                    return 'ok';
                } catch (e) {
                    return 'error: ' + e.message;
                }
            })()
        "#;
        let status = executor.eval(teardown).await?;
        expect_ok(&status)?;

        self.install_presence_watch(executor).await
    }

    /// 取走并清空页面侧积累的信号
    pub async fn drain_signals(&self, executor: &JsExecutor) -> AppResult<Vec<Signal>> {
        executor.eval_as(DRAIN_JS).await
    }

    /// 探测成绩表格是否已出现
    pub async fn table_present(&self, executor: &JsExecutor) -> AppResult<bool> {
        let js = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(&self.selectors.table)?
        );
        executor.eval_as(js).await
    }
}

/// 把脚本返回的状态字符串转成结果
fn expect_ok(status: &JsonValue) -> AppResult<()> {
    match status.as_str() {
        Some(s) if s.starts_with("error:") => Err(AppError::page_exception(s)),
        Some(_) => Ok(()),
        None => Err(page_error(status)),
    }
}

fn page_error(value: &JsonValue) -> AppError {
    AppError::page_exception(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_deserialization() {
        let signals: Vec<Signal> =
            serde_json::from_str(r#"[{"kind":"structure"},{"kind":"toggle"}]"#).unwrap();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].kind, SignalKind::Structure);
        assert_eq!(signals[1].kind, SignalKind::Toggle);
    }

    #[test]
    fn test_expect_ok_passes_status_strings() {
        assert!(expect_ok(&serde_json::json!("installed")).is_ok());
        assert!(expect_ok(&serde_json::json!("already")).is_ok());
    }

    #[test]
    fn test_expect_ok_rejects_page_errors() {
        assert!(expect_ok(&serde_json::json!("error: boom")).is_err());
        assert!(expect_ok(&serde_json::json!(42)).is_err());
    }
}
