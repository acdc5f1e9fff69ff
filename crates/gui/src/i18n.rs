use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lang {
    #[default]
    En,
    Ru,
}

static CURRENT_LANG: AtomicU8 = AtomicU8::new(0); // 0=En (default)

pub fn lang() -> Lang {
    match CURRENT_LANG.load(Ordering::Relaxed) {
        1 => Lang::Ru,
        _ => Lang::En,
    }
}

pub fn set_lang(l: Lang) {
    CURRENT_LANG.store(
        match l {
            Lang::En => 0,
            Lang::Ru => 1,
        },
        Ordering::Relaxed,
    );
}

/// Translate a key to the current language.
pub fn t(key: &str) -> &'static str {
    translate(lang(), key)
}

fn translate(l: Lang, key: &str) -> &'static str {
    let ru = l == Lang::Ru;
    match key {
        // ── Main menus ──────────────────────────────────────
        "menu.file" => if ru { "Файл" } else { "File" },
        "menu.open_bg" => if ru { "Открыть фон..." } else { "Open background..." },
        "menu.open_fg" => if ru { "Открыть передний план..." } else { "Open foreground..." },
        "menu.save_blend" => if ru { "Сохранить результат..." } else { "Save blended image..." },
        "menu.quit" => if ru { "Выход" } else { "Quit" },
        "menu.settings" => if ru { "Настройки" } else { "Settings" },
        "menu.preferences" => if ru { "Параметры..." } else { "Preferences..." },
        "menu.language" => if ru { "Язык" } else { "Language" },

        // ── Title and steps ─────────────────────────────────
        "app.title" => if ru { "2D смешивание + TripoSR 3D" } else { "2D Image Blending + TripoSR 3D" },
        "app.steps" => if ru {
            "1. Загрузите фон и передний план.\n2. «Удалить фон» вырежет объект.\n3. Настройте положение и масштаб.\n4. «Смешать» соберёт итоговое изображение.\n5. «3D (TripoSR)» построит модель."
        } else {
            "1. Upload a background and a foreground image.\n2. Remove BG & init cuts the foreground out.\n3. Adjust position and scale with the sliders.\n4. Blend builds the final 2D image.\n5. Generate 3D creates a TripoSR model."
        },

        // ── Inputs ──────────────────────────────────────────
        "input.background" => if ru { "Фон" } else { "Background" },
        "input.foreground" => if ru { "Передний план" } else { "Foreground" },
        "input.pick" => if ru { "Выбрать..." } else { "Choose..." },
        "input.empty" => if ru { "Нет изображения" } else { "No image" },
        "input.pick_title" => if ru { "Выберите изображение" } else { "Choose an image" },
        "input.images" => if ru { "Изображения" } else { "Images" },

        // ── Actions ─────────────────────────────────────────
        "action.prepare" => if ru { "1️⃣ Удалить фон и подготовить" } else { "1️⃣ Remove BG & init" },
        "action.blend" => if ru { "2️⃣ Смешать" } else { "2️⃣ Blend" },
        "action.reconstruct" => if ru { "3️⃣ 3D (TripoSR по вырезанному объекту)" } else { "3️⃣ Generate 3D (TripoSR on FG no-BG)" },

        // ── Previews ────────────────────────────────────────
        "preview.background" => if ru { "Фон (для справки)" } else { "Background (for reference)" },
        "preview.foreground" => if ru { "Передний план (без фона)" } else { "Foreground (BG removed)" },
        "preview.final" => if ru { "Итоговое 2D изображение" } else { "Final 2D Blended Image" },

        // ── Placement ───────────────────────────────────────
        "placement.title" => if ru { "Положение на фоне" } else { "2D Placement Controls (on Background)" },
        "placement.x" => if ru { "Смещение X (пикс., от центра)" } else { "X offset (px, from center)" },
        "placement.y" => if ru { "Смещение Y (пикс., от центра)" } else { "Y offset (px, from center)" },
        "placement.scale" => if ru { "Масштаб" } else { "Scale factor" },
        "placement.reset" => if ru { "Сбросить" } else { "Reset" },

        // ── 3D ──────────────────────────────────────────────
        "model.title" => if ru { "3D модель (TripoSR)" } else { "3D Model (TripoSR)" },
        "model.none" => if ru { "Модель ещё не построена" } else { "No model generated yet" },
        "model.path" => if ru { "Файл модели:" } else { "Model file:" },
        "model.copy" => if ru { "Копировать путь" } else { "Copy path" },
        "model.no_gl" => if ru { "Просмотр 3D недоступен (нет OpenGL)" } else { "3D preview unavailable (no OpenGL)" },
        "model.no_preview" => if ru { "Этот формат нельзя показать, откройте файл во внешней программе." } else { "This format cannot be previewed; open the file in an external viewer." },
        "model.nav_hint" => if ru { "Тяни: вращать · колесо: масштаб · двойной клик: сброс" } else { "Drag: orbit · wheel: zoom · double-click: reset" },

        // ── Status ──────────────────────────────────────────
        "status.ready" => if ru { "Готово" } else { "Ready" },
        "status.preparing" => if ru { "Удаление фона..." } else { "Removing background..." },
        "status.blending" => if ru { "Смешивание..." } else { "Blending..." },
        "status.reconstructing" => if ru { "TripoSR работает..." } else { "Running TripoSR..." },
        "status.saved" => if ru { "Сохранено" } else { "Saved" },

        // ── Errors ──────────────────────────────────────────
        "err.need_both" => if ru { "Загрузите ОБА изображения: фон и передний план." } else { "Please upload BOTH background and foreground images." },
        "err.need_prepare" => if ru { "Сначала выполните «Удалить фон и подготовить»." } else { "You must run 'Remove BG & init' first." },
        "err.need_prepare_3d" => if ru {
            "Сначала выполните «Удалить фон и подготовить», чтобы получить объект без фона."
        } else {
            "You must run 'Remove BG & init' first so we have a foreground without background."
        },
        "err.busy" => if ru { "Подождите завершения текущей операции." } else { "Wait for the current operation to finish." },
        "err.nothing_to_save" => if ru { "Нет результата для сохранения." } else { "Nothing to save yet: run Blend first." },

        // ── Settings window ─────────────────────────────────
        "settings.title" => if ru { "Настройки" } else { "Settings" },
        "settings.ui" => if ru { "Интерфейс" } else { "Interface" },
        "settings.font_size" => if ru { "Размер шрифта" } else { "Font size" },
        "settings.close" => if ru { "Закрыть" } else { "Close" },

        // ── Fallback ────────────────────────────────────────
        _ => "???",
    }
}
