//! Script template engine. Picks a per-platform template and fills each
//! multi-candidate slot with a uniformly random variant.
//!
//! Never touches the network; the only side effect is randomness.

use crate::domain::platform;
use crate::domain::{Drama, Script, ScriptBeat, ScriptSet};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::sync::Arc;
use tracing::debug;

/// Template used when a platform id has no template of its own.
pub const DEFAULT_TEMPLATE_ID: &str = "tiktok";

struct BeatTemplate {
    time: &'static str,
    /// One entry for fixed beats, several for beats that vary per generation.
    content: &'static [&'static str],
    highlight: bool,
}

struct Template {
    id: &'static str,
    duration: &'static str,
    hook: &'static str,
    hook_content: &'static [&'static str],
    structure: &'static [BeatTemplate],
    tags: &'static [&'static str],
    music: &'static [&'static str],
    tips: &'static str,
}

const fn beat(
    time: &'static str,
    content: &'static [&'static str],
    highlight: bool,
) -> BeatTemplate {
    BeatTemplate {
        time,
        content,
        highlight,
    }
}

const TEMPLATES: [Template; 4] = [
    Template {
        id: "tiktok",
        duration: "15秒",
        hook: "前3秒爆点",
        hook_content: &[
            "她被陷害流落街头，谁知路边救的老人竟是首富！#短剧 #短剧推荐",
            "开局就炸裂！一碗面改变她的人生，接下来更离谱… #爽剧",
            "三秒钟带你入坑：她救下的老人竟是财阀掌门人！#反转",
        ],
        structure: &[
            beat("0-3秒", &["女主落魄镜头 + 震撼文案"], true),
            beat(
                "3-8秒",
                &["转折点剪辑（救人/相遇）", "冲突引爆：矛盾正面碰撞"],
                false,
            ),
            beat("8-12秒", &["反转高潮画面"], false),
            beat("12-15秒", &["引导完整版观看"], false),
        ],
        tags: &["#短剧 #爽剧 #必看", "#短剧推荐 #反转 #高能", "#热门 #剧情反转"],
        music: &["节奏感强的热门BGM", "低频鼓点+电音氛围", "断点式节奏BGM"],
        tips: "抖音用户喜欢快节奏、强反转的内容，前3秒必须抓住眼球",
    },
    Template {
        id: "facebook",
        duration: "60-90秒",
        hook: "故事引入",
        hook_content: &[
            "一个精彩的故事，看到最后你会被震撼...",
            "她做了一次决定，彻底改变全家人的命运…",
            "完整故事线+强情绪，结尾的反转绝对出乎意料",
        ],
        structure: &[
            beat("0-10秒", &["背景介绍 + 人物设定"], false),
            beat(
                "10-40秒",
                &["冲突展开（3-4个关键转折点）", "推进主线：铺垫-冲突-升级"],
                true,
            ),
            beat("40-70秒", &["高潮片段串联"], false),
            beat("70-90秒", &["悬念结尾 + 完整版链接"], false),
        ],
        tags: &["精彩短剧分享", "今日追剧必看", "家庭/爱情/反转"],
        music: &["情感渲染BGM", "钢琴+弦乐情绪线", "暖色氛围BGM"],
        tips: "Facebook用户更喜欢有完整故事线的内容，可以适当延长时长",
    },
    Template {
        id: "instagram",
        duration: "30-60秒",
        hook: "视觉冲击",
        hook_content: &[
            "绝美镜头语言讲述精彩故事",
            "胶片质感+慢镜头，氛围感拉满",
            "大片级配色，三秒抓住眼球",
        ],
        structure: &[
            beat("0-5秒", &["精美画面开场"], true),
            beat(
                "5-25秒",
                &["快节奏剪辑（每3秒一个冲击点）", "镜头语言递进（特写-中景-远景）"],
                false,
            ),
            beat("25-50秒", &["情感高潮"], false),
            beat("50-60秒", &["CTA + Swipe Up"], false),
        ],
        tags: &["#短剧推荐 #Reels", "#影像 #氛围感", "#视觉大片"],
        music: &["流行热门音乐", "鼓点明快的电子乐", "氛围感流行"],
        tips: "Instagram注重视觉美感，需要精美的画面和流畅的转场",
    },
    Template {
        id: "x",
        duration: "45秒",
        hook: "话题性开场",
        hook_content: &[
            "这部短剧火了！5分钟看完完整剧情走向",
            "热议话题：她的一句话引爆全网评论区",
            "三点总结剧情精华，一眼看爽点",
        ],
        structure: &[
            beat("0-5秒", &["话题引入"], true),
            beat("5-30秒", &["快速剧情梗概（突出爽点）"], false),
            beat("30-40秒", &["最精彩片段"], false),
            beat("40-45秒", &["互动引导（评论/转发）"], false),
        ],
        tags: &["#短剧 #热门", "#讨论度高", "#反转"],
        music: &["简洁BGM不抢戏", "低频节奏+口播", "轻快流行"],
        tips: "X平台用户喜欢有话题性和讨论价值的内容",
    },
];

fn template_for(canonical_id: &str) -> &'static Template {
    TEMPLATES
        .iter()
        .find(|t| t.id == canonical_id)
        .or_else(|| TEMPLATES.iter().find(|t| t.id == DEFAULT_TEMPLATE_ID))
        .unwrap_or(&TEMPLATES[0])
}

fn pick<R: Rng + ?Sized>(rng: &mut R, candidates: &[&'static str]) -> String {
    candidates
        .choose(rng)
        .map(|s| (*s).to_string())
        .unwrap_or_default()
}

/// Generate a script for `platform_id` using the thread-local RNG.
pub fn generate(drama: &Drama, platform_id: &str) -> Script {
    generate_with(&mut rand::rng(), drama, platform_id)
}

/// Generate a script drawing variants from `rng`.
///
/// The platform id is normalized first; the script keeps the normalized id even when
/// its content comes from the default template.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, drama: &Drama, platform_id: &str) -> Script {
    let platform = platform::resolve(platform_id);
    let tpl = template_for(&platform.id);
    debug!(
        drama = %drama.title,
        platform = %platform.id,
        template = tpl.id,
        "generating script"
    );

    let structure = tpl
        .structure
        .iter()
        .map(|b| ScriptBeat {
            time_range: b.time.to_string(),
            content: pick(&mut *rng, b.content),
            highlighted: b.highlight,
        })
        .collect();

    Script {
        platform_id: platform.id,
        platform_name: platform.name,
        platform_icon: platform.icon,
        platform_color: platform.color,
        duration_label: tpl.duration.to_string(),
        hook_label: tpl.hook.to_string(),
        hook_text: pick(rng, tpl.hook_content),
        structure,
        tags_text: pick(rng, tpl.tags),
        music_text: pick(rng, tpl.music),
        tip_text: tpl.tips.to_string(),
    }
}

/// Build a fresh script set for `drama`, one script per platform in the given order.
pub fn build_set(drama: &Drama, platform_ids: &[String]) -> ScriptSet {
    let platform_ids = platform::normalize_all(platform_ids);
    let scripts = platform_ids
        .iter()
        .map(|id| Arc::new(generate(drama, id)))
        .collect();
    ScriptSet {
        drama: drama.clone(),
        scripts,
        platform_ids,
    }
}

/// Replace the scripts whose platform is in `targets` (all when `None`) with fresh ones.
/// Untouched entries are carried over as the same `Arc`, in their original order.
pub fn regenerate(set: &ScriptSet, targets: Option<&[String]>) -> ScriptSet {
    regenerate_with(&mut rand::rng(), set, targets)
}

pub fn regenerate_with<R: Rng + ?Sized>(
    rng: &mut R,
    set: &ScriptSet,
    targets: Option<&[String]>,
) -> ScriptSet {
    let targets = targets.map(platform::normalize_all::<String>);
    let scripts = set
        .scripts
        .iter()
        .map(|s| {
            let hit = targets
                .as_ref()
                .is_none_or(|t| t.iter().any(|id| *id == s.platform_id));
            if hit {
                Arc::new(generate_with(&mut *rng, &set.drama, &s.platform_id))
            } else {
                Arc::clone(s)
            }
        })
        .collect();
    ScriptSet {
        drama: set.drama.clone(),
        scripts,
        platform_ids: set.platform_ids.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn drama() -> Drama {
        Drama::titled("示例短剧")
    }

    fn timings(s: &Script) -> Vec<String> {
        s.structure.iter().map(|b| b.time_range.clone()).collect()
    }

    #[test]
    fn test_generate_fixed_slots_are_stable() {
        let a = generate(&drama(), "tiktok");
        let b = generate(&drama(), "tiktok");
        assert_eq!(a.duration_label, "15秒");
        assert_eq!(a.duration_label, b.duration_label);
        assert_eq!(a.hook_label, b.hook_label);
        assert_eq!(timings(&a), timings(&b));
        assert_eq!(timings(&a), vec!["0-3秒", "3-8秒", "8-12秒", "12-15秒"]);
        assert!(a.structure[0].highlighted);
    }

    #[test]
    fn test_generate_varies_across_calls() {
        let mut rng = StdRng::seed_from_u64(7);
        let hooks: std::collections::HashSet<String> = (0..50)
            .map(|_| generate_with(&mut rng, &drama(), "tiktok").hook_text)
            .collect();
        assert!(hooks.len() > 1);
    }

    #[test]
    fn test_generate_alias_uses_canonical_template() {
        let s = generate(&drama(), "IG");
        assert_eq!(s.platform_id, "instagram");
        assert_eq!(s.platform_name, "Instagram");
        assert_eq!(s.duration_label, "30-60秒");
    }

    #[test]
    fn test_unknown_platform_falls_back_to_default_template() {
        let s = generate(&drama(), "weibo");
        assert_eq!(s.platform_id, "weibo");
        assert_eq!(s.platform_icon, "✨");
        assert_eq!(s.duration_label, "15秒");
        assert_eq!(s.hook_label, "前3秒爆点");
    }

    #[test]
    fn test_build_set_keeps_order() {
        let set = build_set(&drama(), &["douyin".to_string(), "ig".to_string()]);
        let ids: Vec<&str> = set.scripts.iter().map(|s| s.platform_id.as_str()).collect();
        assert_eq!(ids, vec!["tiktok", "instagram"]);
        assert_eq!(set.platform_ids, vec!["tiktok", "instagram"]);
    }

    #[test]
    fn test_regenerate_single_platform_keeps_others() {
        let set = build_set(
            &drama(),
            &["tiktok".to_string(), "facebook".to_string(), "x".to_string()],
        );
        let mut rng = StdRng::seed_from_u64(42);
        let mut changed = false;
        for _ in 0..20 {
            let next = regenerate_with(&mut rng, &set, Some(&["facebook".to_string()][..]));
            assert!(Arc::ptr_eq(&set.scripts[0], &next.scripts[0]));
            assert!(Arc::ptr_eq(&set.scripts[2], &next.scripts[2]));
            assert!(!Arc::ptr_eq(&set.scripts[1], &next.scripts[1]));
            assert_eq!(next.scripts[1].platform_id, "facebook");
            changed |= next.scripts[1].hook_text != set.scripts[1].hook_text;
        }
        assert!(changed);
    }

    #[test]
    fn test_regenerate_all() {
        let set = build_set(&drama(), &["tiktok".to_string(), "x".to_string()]);
        let next = regenerate(&set, None);
        assert_eq!(next.scripts.len(), 2);
        assert!(!Arc::ptr_eq(&set.scripts[0], &next.scripts[0]));
        assert!(!Arc::ptr_eq(&set.scripts[1], &next.scripts[1]));
        assert_eq!(next.platform_ids, set.platform_ids);
    }

    #[test]
    fn test_regenerate_target_alias_matches() {
        let set = build_set(&drama(), &["tiktok".to_string(), "x".to_string()]);
        let next = regenerate(&set, Some(&["twitter".to_string()][..]));
        assert!(Arc::ptr_eq(&set.scripts[0], &next.scripts[0]));
        assert!(!Arc::ptr_eq(&set.scripts[1], &next.scripts[1]));
    }
}
