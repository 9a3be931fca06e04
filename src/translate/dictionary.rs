//! Static Chinese → English phrase table used when every remote service fails.
//!
//! Replacement is sequential exact-substring substitution in table order.
//! Later entries see the output of earlier ones, and a shorter term that is
//! part of a longer one (女孩 in 女孩子) matches first if it comes first.
//! Terms are not reordered to compensate.

pub const DICTIONARY: &[(&str, &str)] = &[
    // subjects
    ("美丽", "beautiful"),
    ("漂亮", "pretty"),
    ("女孩", "girl"),
    ("男孩", "boy"),
    ("女人", "woman"),
    ("男人", "man"),
    ("猫", "cat"),
    ("狗", "dog"),
    ("花", "flower"),
    ("树", "tree"),
    ("山", "mountain"),
    ("海", "sea"),
    ("天空", "sky"),
    ("云", "cloud"),
    ("太阳", "sun"),
    ("月亮", "moon"),
    ("星星", "star"),
    // colours
    ("红色", "red"),
    ("蓝色", "blue"),
    ("绿色", "green"),
    ("黄色", "yellow"),
    ("黑色", "black"),
    ("白色", "white"),
    ("紫色", "purple"),
    ("粉色", "pink"),
    // styles
    ("动漫", "anime"),
    ("写实", "realistic"),
    ("艺术", "artistic"),
    ("油画", "oil painting"),
    ("水彩", "watercolor"),
    ("素描", "sketch"),
    ("电影", "cinematic"),
    ("梦幻", "dreamy"),
    ("科幻", "sci-fi"),
    ("未来", "futuristic"),
    // actions
    ("站立", "standing"),
    ("坐着", "sitting"),
    ("跑步", "running"),
    ("飞行", "flying"),
    ("游泳", "swimming"),
    // scenes
    ("森林", "forest"),
    ("城市", "city"),
    ("街道", "street"),
    ("房间", "room"),
    ("花园", "garden"),
    ("海滩", "beach"),
    ("沙漠", "desert"),
    // time of day
    ("白天", "daytime"),
    ("夜晚", "night"),
    ("黄昏", "sunset"),
    ("黎明", "dawn"),
    // mood
    ("快乐", "happy"),
    ("悲伤", "sad"),
    ("神秘", "mysterious"),
    ("浪漫", "romantic"),
    ("温暖", "warm"),
    ("寒冷", "cold"),
    // quality
    ("高质量", "high quality"),
    ("详细", "detailed"),
    ("精美", "exquisite"),
    ("完美", "perfect"),
    ("专业", "professional"),
    ("杰作", "masterpiece"),
    // photography
    ("特写", "close-up"),
    ("全身", "full body"),
    ("半身像", "portrait"),
    ("广角", "wide angle"),
    ("微距", "macro"),
    ("虚化背景", "blurred background"),
    // clothing
    ("连衣裙", "dress"),
    ("衬衫", "shirt"),
    ("外套", "coat"),
    ("帽子", "hat"),
    ("鞋子", "shoes"),
    // intensity
    ("非常", "very"),
    ("极其", "extremely"),
    ("稍微", "slightly"),
    ("有点", "a bit"),
    ("完全", "completely"),
    // viewpoint
    ("俯视", "bird's eye view"),
    ("仰视", "low angle"),
    ("侧面", "side view"),
    ("正面", "front view"),
    ("背面", "back view"),
];

/// Apply every table entry in order as a global substring replacement.
#[must_use]
pub fn substitute(text: &str) -> String {
    DICTIONARY
        .iter()
        .fold(text.to_string(), |acc, (zh, en)| if acc.contains(zh) { acc.replace(zh, en) } else { acc })
}

#[cfg(test)]
#[path = "dictionary_test.rs"]
mod tests;
