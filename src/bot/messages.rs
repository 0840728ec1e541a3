//! User-facing message templates (legacy Telegram Markdown).

use std::collections::HashMap;

use crate::catalog::{self, LanguageDefinition, StyleDefinition};
use crate::format::DIVIDER;
use crate::metrics::{metric_names, MetricSummary};
use crate::preferences::{PreferenceError, PreferenceFlag, PreferenceRecord};
use crate::stats::{UsageStatistics, UsageSummary};

fn yes_no(value: bool) -> &'static str {
    if value {
        "✅ Có"
    } else {
        "❌ Không"
    }
}

pub fn on_off(value: bool) -> &'static str {
    if value {
        "Bật"
    } else {
        "Tắt"
    }
}

pub fn flag_label(flag: PreferenceFlag) -> &'static str {
    match flag {
        PreferenceFlag::PreserveFormatting => "Giữ format",
        PreferenceFlag::AddExplanatoryNotes => "Thêm ghi chú",
        PreferenceFlag::ShowOriginalText => "Hiện bản gốc",
    }
}

pub fn welcome(first_name: &str) -> String {
    format!(
        "🌐 *Xin chào {first_name}! Chào mừng đến với Bot Dịch Thuật*\n\n\
         🤖 *Tôi có thể:*\n\
         • Dịch văn bản sang nhiều ngôn ngữ\n\
         • Giữ nguyên format văn bản\n\
         • Hỗ trợ nhiều phong cách dịch\n\n\
         📝 *Cách sử dụng:*\n\
         Gửi văn bản → Nhận bản dịch ngay lập tức\n\n\
         ⚙️ *Lệnh hữu ích:*\n\
         /style - Chọn phong cách dịch\n\
         /language - Chọn ngôn ngữ đích\n\
         /settings - Tùy chỉnh cài đặt\n\
         /stats - Xem thống kê sử dụng\n\
         /help - Hướng dẫn chi tiết\n\n\
         💡 _Gửi văn bản bất kỳ để bắt đầu dịch!_"
    )
}

pub fn help(max_message_length: usize) -> String {
    let styles: String = catalog::list_styles()
        .iter()
        .map(|s| format!("{} - {}\n", s.display_name, s.description))
        .collect();
    format!(
        "📚 *HƯỚNG DẪN SỬ DỤNG CHI TIẾT*\n\n\
         🔹 *Tính năng chính:*\n\
         • Dịch đa ngôn ngữ với AI tiên tiến\n\
         • Giữ nguyên format (bold, italic, code...)\n\
         • {} phong cách dịch chuyên biệt\n\
         • Tùy chỉnh độ sáng tạo (temperature)\n\
         • Thống kê sử dụng cá nhân\n\n\
         🔹 *Các lệnh:*\n\
         `/start` - Khởi động bot\n\
         `/style` - Chọn phong cách dịch\n\
         `/language` - Chọn ngôn ngữ đích\n\
         `/settings` - Cài đặt cá nhân\n\
         `/temp [0.1-1.0]` - Điều chỉnh độ sáng tạo\n\
         `/stats` - Xem thống kê\n\
         `/reset` - Đặt lại cài đặt mặc định\n\
         `/about` - Thông tin bot\n\n\
         🔹 *Phong cách dịch:*\n\
         {styles}\n\
         💡 *Mẹo:*\n\
         • Có thể gửi văn bản dài (max {max_message_length} ký tự)\n\
         • Hỗ trợ Markdown format\n\
         • Chọn phong cách phù hợp nội dung",
        catalog::list_styles().len()
    )
}

pub fn about(model: &str) -> String {
    format!(
        "🤖 *TELEGRAM TRANSLATOR BOT*\n\
         {DIVIDER}\n\n\
         🧠 *AI Model:* {model}\n\
         ⚡ *Framework:* Rust + teloxide\n\n\
         ✨ *Features:*\n\
         • Multi-language translation\n\
         • Format preservation\n\
         • Multiple translation styles\n\
         • User preferences\n\
         • Usage statistics\n\n\
         _Open source translation bot for everyone_"
    )
}

pub fn stats_disabled() -> &'static str {
    "📊 Thống kê đã bị tắt bởi admin."
}

pub fn stats_empty() -> &'static str {
    "📊 Bạn chưa có thống kê nào. Hãy bắt đầu dịch!"
}

pub fn stats(stats: &UsageStatistics, preferences: &PreferenceRecord) -> String {
    let style = catalog::style_or_default(&preferences.style_key);
    format!(
        "📊 *THỐNG KÊ SỬ DỤNG CỦA BẠN*\n\
         {DIVIDER}\n\n\
         📝 *Số lần dịch:* {}\n\
         ⚡ *Lệnh đã dùng:* {}\n\
         🎨 *Phong cách hiện tại:* {}\n\
         🌍 *Ngôn ngữ đích:* {}\n\
         📅 *Lần đầu sử dụng:* {}\n\
         🕒 *Lần cuối sử dụng:* {}\n\n\
         _Cảm ơn bạn đã sử dụng bot!_",
        stats.translation_count,
        stats.command_count,
        style.display_name,
        catalog::language_name(&preferences.target_language_code),
        stats.first_used_at.format("%Y-%m-%d"),
        stats.last_used_at.format("%Y-%m-%d"),
    )
}

pub fn reset_done() -> &'static str {
    "🔄 *Đã đặt lại cài đặt mặc định!*\n\n\
     Tất cả tùy chỉnh của bạn đã được khôi phục về mặc định."
}

pub fn language_menu_title() -> &'static str {
    "🌍 *Chọn ngôn ngữ đích cho bản dịch:*\n\n\
     _Ngôn ngữ này sẽ được sử dụng cho tất cả bản dịch_"
}

pub fn style_menu_title() -> &'static str {
    "🎨 *Chọn phong cách dịch:*\n\n\
     _Mỗi phong cách có cách diễn đạt riêng phù hợp với từng loại nội dung_"
}

pub fn settings(preferences: &PreferenceRecord) -> String {
    let style = catalog::style_or_default(&preferences.style_key);
    format!(
        "⚙️ *CÀI ĐẶT HIỆN TẠI*\n\
         {DIVIDER}\n\n\
         🎨 *Phong cách:* {}\n\
         🌍 *Ngôn ngữ đích:* {}\n\
         🌡️ *Độ sáng tạo:* {}\n\
         📝 *Giữ format:* {}\n\
         📌 *Thêm ghi chú:* {}\n\
         👁️ *Hiện bản gốc:* {}\n\n\
         _Dùng các nút bên dưới để thay đổi_",
        style.display_name,
        catalog::language_name(&preferences.target_language_code),
        preferences.temperature,
        yes_no(preferences.preserve_formatting),
        yes_no(preferences.add_explanatory_notes),
        yes_no(preferences.show_original_text),
    )
}

pub fn temp_usage(current: f64) -> String {
    format!(
        "🌡️ *ĐIỀU CHỈNH ĐỘ SÁNG TẠO*\n\n\
         📊 *Cách dùng:* `/temp <giá trị>`\n\
         📏 *Phạm vi:* 0.1 - 1.0\n\n\
         🎯 *Hướng dẫn:*\n\
         • `0.1-0.3` - Dịch sát nghĩa, ít sáng tạo\n\
         • `0.4-0.6` - Cân bằng tốt\n\
         • `0.7-1.0` - Sáng tạo, linh hoạt cao\n\n\
         📍 *Giá trị hiện tại:* `{current}`\n\n\
         _Ví dụ: /temp 0.5_"
    )
}

pub fn temp_set(value: f64) -> String {
    format!("✅ Đã điều chỉnh độ sáng tạo: *{value}*\n\n_Áp dụng cho các bản dịch tiếp theo_")
}

pub fn temp_out_of_range() -> &'static str {
    "⚠️ Giá trị phải từ 0.1 đến 1.0"
}

pub fn temp_invalid() -> &'static str {
    "⚠️ Vui lòng nhập số hợp lệ (0.1 - 1.0)"
}

pub fn style_selected(style: &StyleDefinition) -> String {
    format!(
        "✅ Đã chọn phong cách: *{}*\n\n_{}_",
        style.display_name, style.description
    )
}

pub fn language_selected(language: &LanguageDefinition) -> String {
    format!("✅ Đã chọn ngôn ngữ đích: *{}*", language.display_name)
}

pub fn style_info() -> String {
    let mut text = String::from("📖 *CHI TIẾT CÁC PHONG CÁCH DỊCH*\n\n");
    for style in catalog::list_styles() {
        text.push_str(&format!(
            "{}\n_{}_\n🌡️ {}\n\n",
            style.display_name, style.description, style.default_temperature
        ));
    }
    text
}

pub fn toggle_notice(flag: PreferenceFlag, value: bool) -> String {
    format!("{}: {}", flag_label(flag), on_off(value))
}

/// Short callback-answer text for a rejected selection.
pub fn rejected(error: &PreferenceError) -> String {
    match error {
        PreferenceError::UnknownStyle(key) => format!("⚠️ Phong cách không hợp lệ: {key}"),
        PreferenceError::UnknownLanguage(code) => format!("⚠️ Ngôn ngữ không hỗ trợ: {code}"),
        PreferenceError::UnknownFlag(name) => format!("⚠️ Tùy chọn không hợp lệ: {name}"),
        PreferenceError::OutOfRange(_) => temp_out_of_range().to_string(),
    }
}

pub fn unsupported_action() -> &'static str {
    "⚠️ Thao tác không được hỗ trợ"
}

pub fn translating() -> &'static str {
    "🔄 *Đang dịch...*"
}

pub fn too_long(max: usize, actual: usize) -> String {
    format!("⚠️ Văn bản quá dài! Tối đa {max} ký tự.\nVăn bản của bạn: {actual} ký tự.")
}

pub fn generic_error() -> &'static str {
    "❌ *Đã xảy ra lỗi!*\n\n\
     Vui lòng thử lại sau hoặc liên hệ admin.\n\
     Sử dụng /help để xem hướng dẫn."
}

pub fn admin_denied() -> &'static str {
    "⛔ Lệnh này chỉ dành cho admin."
}

pub fn admin_report(usage: &UsageSummary, metrics: &HashMap<String, MetricSummary>) -> String {
    let mut text = format!(
        "🛠️ *THỐNG KÊ HỆ THỐNG*\n\
         {DIVIDER}\n\n\
         👥 *Người dùng:* {}\n\
         📝 *Tổng số lần dịch:* {}\n\
         ⚡ *Tổng số lệnh:* {}\n",
        usage.callers, usage.translations, usage.commands
    );
    for (name, label) in [
        (metric_names::GATEWAY_CALL, "Gọi API"),
        (metric_names::GATEWAY_ERROR, "Lỗi API"),
        (metric_names::TRANSLATE_TOTAL, "Tổng thời gian dịch"),
    ] {
        if let Some(m) = metrics.get(name) {
            text.push_str(&format!(
                "\n⏱️ *{label}* ({} mẫu): p50 {:.0}ms · p95 {:.0}ms · p99 {:.0}ms",
                m.count,
                m.p50_us / 1000.0,
                m.p95_us / 1000.0,
                m.p99_us / 1000.0
            ));
        }
    }
    text
}
