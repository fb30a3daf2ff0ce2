//! Localized operator-facing text.
//!
//! The language is chosen once at startup; the resulting `&'static Messages`
//! is passed to every component that prints or sends localized text.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supported interface languages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    #[strum(serialize = "en")]
    English,
    #[serde(rename = "ru")]
    #[strum(serialize = "ru")]
    Russian,
    #[serde(rename = "tr")]
    #[strum(serialize = "tr")]
    Turkish,
}

impl Language {
    /// Resolves a language prompt answer: `1`/`2`/`3`, a code, or empty for English.
    pub fn from_choice(input: &str) -> Option<Self> {
        let choice = input.trim();
        match choice {
            "" | "1" => Some(Language::English),
            "2" => Some(Language::Russian),
            "3" => Some(Language::Turkish),
            code => code.parse().ok(),
        }
    }

    /// ISO 639-1 code, also used as the speech recognition language.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Russian => "ru",
            Language::Turkish => "tr",
        }
    }

    pub fn messages(self) -> &'static Messages {
        match self {
            Language::English => &EN,
            Language::Russian => &RU,
            Language::Turkish => &TR,
        }
    }
}

/// Fills `{key}` placeholders in `template`.
pub fn render_template(template: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("{{{key}}}"), value)
    })
}

/// Every string shown to the operator or sent to the model as instruction.
#[derive(Debug)]
pub struct Messages {
    pub name: &'static str,
    pub app_title: &'static str,
    pub exit_command: &'static str,
    pub error_api: &'static str,
    pub error_unexpected: &'static str,
    pub error_init: &'static str,
    pub error_api_key: &'static str,
    pub error_config: &'static str,
    pub error_saving_history: &'static str,

    pub history_available: &'static str,
    pub history_none: &'static str,
    pub history_default_name: &'static str,
    pub history_prompt_1: &'static str,
    pub history_prompt_2: &'static str,
    pub history_prompt_input: &'static str,
    pub history_loading_existing: &'static str,
    pub history_creating_new: &'static str,
    pub history_invalid_number: &'static str,

    pub chat_mode_title: &'static str,
    pub command_title: &'static str,
    pub command_1: &'static str,
    pub command_2: &'static str,
    pub command_3: &'static str,
    pub saving_history: &'static str,
    pub interrupted: &'static str,

    pub analyze_start: &'static str,
    pub analyze_folder: &'static str,
    pub upload_skipping_large: &'static str,
    pub upload_file: &'static str,
    pub upload_fallback: &'static str,
    pub upload_failed: &'static str,
    pub analyze_usage_error: &'static str,
    pub analyze_usage_note: &'static str,
    pub error_folder_not_found: &'static str,
    pub analyze_check_exists: &'static str,
    pub analyze_check_not_found: &'static str,
    pub analyze_failed_no_files: &'static str,
    pub cleanup_start: &'static str,
    pub cleanup_warning: &'static str,

    pub lang_title: &'static str,
    pub lang_prompt: &'static str,
    pub lang_1: &'static str,
    pub lang_2: &'static str,
    pub lang_3: &'static str,
    pub lang_input: &'static str,
    pub lang_selected: &'static str,
    pub lang_invalid: &'static str,
    pub sysinfo_non_linux: &'static str,

    pub mode_title: &'static str,
    pub mode_prompt: &'static str,
    pub mode_1: &'static str,
    pub mode_2: &'static str,
    pub mode_input: &'static str,
    pub mode_selected_text: &'static str,
    pub mode_selected_voice: &'static str,

    pub voice_prompt: &'static str,
    pub voice_exit: &'static str,
    pub voice_ready: &'static str,
    pub voice_listening: &'static str,
    pub voice_recognizing: &'static str,
    pub voice_recognized: &'static str,
    pub voice_error_speech: &'static str,
    pub voice_error_mic: &'static str,
    pub voice_error_request: &'static str,
    pub voice_error_no_key: &'static str,
    pub voice_sending: &'static str,

    pub system_instruction: &'static str,
}

impl Messages {
    /// Words that end a session: `exit`, `quit`, and the localized phrase's
    /// first and last word.
    pub fn exit_words(&self) -> Vec<&'static str> {
        let mut words = vec!["exit", "quit"];
        let mut phrase = self.exit_command.split_whitespace();
        let first = phrase.next();
        let last = phrase.last().or(first);
        for word in [first, last].into_iter().flatten() {
            if !words.contains(&word) {
                words.push(word);
            }
        }
        words
    }

    /// True when `input` is one of the exit words, ignoring case and padding.
    pub fn is_exit(&self, input: &str) -> bool {
        let lowered = input.trim().to_lowercase();
        self.exit_words().iter().any(|word| *word == lowered)
    }
}

pub static EN: Messages = Messages {
    name: "English",
    app_title: "Gemini CLI Assistant: History Management, File Analysis & Voice Mode",
    exit_command: "exit or quit",
    error_api: "Gemini API Error: ",
    error_unexpected: "Unexpected error: ",
    error_init: "Gemini initialization error: ",
    error_api_key: "Error: 'GEMINI_API_KEY' environment variable not found.",
    error_config: "Configuration error: ",
    error_saving_history: "Error saving history: ",

    history_available: "📚 Available histories in the current directory:",
    history_none: "💡 No available histories found. A new one will be created.",
    history_default_name: "   (Default name will be used: {default_name})",
    history_prompt_1: "1. History number [1, 2, 3...] to load an existing dialogue.",
    history_prompt_2: "2. New name (e.g., 'project_A.chat_history.txt') to create/continue.",
    history_prompt_input: "Your choice (or Enter for a new history): ",
    history_loading_existing: "Loading existing history: ",
    history_creating_new: "Creating new history: ",
    history_invalid_number: "Invalid number. Enter a number from 1 to {max}.",

    chat_mode_title: "Gemini CLI Chat Mode. History: ",
    command_title: "COMMANDS:",
    command_1: "1. Dialogue: Just type your question.",
    command_2: "2. Analyze:  /analyze <folder_path> \"Your question\" (Supports code, text, PNG, JPG)",
    command_3: "3. Exit:     exit or quit",
    saving_history: "Saving history and ending session.",
    interrupted: "Interrupted.",

    analyze_start: "Starting analysis of folder: ",
    analyze_folder: "Analyzing folder: ",
    upload_skipping_large: "Skipping large file: ",
    upload_file: "  Uploading: {file_name} as {mime_type}...",
    upload_fallback: "  [Fallback]: Uploading without explicit mime_type...",
    upload_failed: "  Failed to upload {file_name}: {error}",
    analyze_usage_error: "🛑 Usage Error: /analyze folder_name \"Your analysis prompt\"",
    analyze_usage_note: "   NOTE: The prompt (question) must be enclosed in double quotes.",
    error_folder_not_found: "Error: Folder path not found: ",
    analyze_check_exists: "Directory exists",
    analyze_check_not_found: "Directory not found",
    analyze_failed_no_files: "🛑 Analysis failed for path '{path}'. Path check result: '{check}'. No valid files were uploaded.",
    cleanup_start: "Cleaning up uploaded files...",
    cleanup_warning: "  Warning: Failed to delete {file_name}: {error}",

    lang_title: "Language Selection",
    lang_prompt: "Please select your language (Default is English):",
    lang_1: "[1] English",
    lang_2: "[2] Russian",
    lang_3: "[3] Turkish",
    lang_input: "Your choice [1/2/3 or EN/RU/TR]: ",
    lang_selected: "Selected language: {lang}",
    lang_invalid: "Invalid choice. Please enter 1, 2, 3, or the language code.",
    sysinfo_non_linux: "System info retrieval skipped (Non-Linux OS).",

    mode_title: "Mode Selection",
    mode_prompt: "Please select the interaction mode:",
    mode_1: "[1] Standard Text Chat",
    mode_2: "[2] Voice Chat (Listen and respond)",
    mode_input: "Your choice [1/2]: ",
    mode_selected_text: "Starting Standard Text Chat...",
    mode_selected_voice: "Starting Voice Chat Mode (Listening for input)...",

    voice_prompt: ">> Speak: ",
    voice_exit: "Say 'exit' or 'quit' to end the session.",
    voice_ready: "🔊 Noise level adjusted. Ready.",
    voice_listening: "🎙️ Listening...",
    voice_recognizing: "🧠 Recognizing your speech...",
    voice_recognized: "✅ Recognized: ",
    voice_error_speech: "❌ Could not understand audio. Please try again.",
    voice_error_mic: "❌ No suitable microphone found or error during audio capture.",
    voice_error_request: "❌ Speech Recognition API Error: ",
    voice_error_no_key: "❌ Voice mode needs GOOGLE_SPEECH_API_KEY to be set.",
    voice_sending: "✨ Sending to Gemini: ",

    system_instruction: "You are a highly intelligent CLI assistant. Your task is to analyze the provided files (code, text, images) and command history, responding briefly, accurately, and using Markdown for code formatting. If files are attached, focus on their analysis. If the user attempts to upload files but the operation failed, politely explain that files could not be found or the folder does not exist, and ask them to check the path.",
};

pub static RU: Messages = Messages {
    name: "Русский",
    app_title: "Gemini CLI Ассистент: Управление историей, анализ файлов и Голосовой Режим",
    exit_command: "exit или quit",
    error_api: "Ошибка API Gemini: ",
    error_unexpected: "Непредвиденная ошибка: ",
    error_init: "Ошибка инициализации Gemini: ",
    error_api_key: "Ошибка: Не найдена переменная окружения 'GEMINI_API_KEY'.",
    error_config: "Ошибка конфигурации: ",
    error_saving_history: "Ошибка сохранения истории: ",

    history_available: "📚 Доступные истории в текущей директории:",
    history_none: "💡 Доступных историй не найдено. Будет создана новая история.",
    history_default_name: "   (По умолчанию будет использовано имя: {default_name})",
    history_prompt_1: "1. Номер истории [1, 2, 3...] для загрузки существующего диалога.",
    history_prompt_2: "2. Новое имя (например, 'project_A.chat_history.txt') для создания/продолжения.",
    history_prompt_input: "Ваш выбор (или Enter для новой истории): ",
    history_loading_existing: "Загрузка существующей истории: ",
    history_creating_new: "Создание новой истории: ",
    history_invalid_number: "Неверный номер. Введите число от 1 до {max}.",

    chat_mode_title: "Gemini CLI Режим Чата. История: ",
    command_title: "КОМАНДЫ:",
    command_1: "1. Диалог: Просто введите ваш вопрос.",
    command_2: "2. Анализ:  /analyze <путь_к_папке> \"Ваш вопрос\" (Поддерживает код, текст, PNG, JPG)",
    command_3: "3. Выход:     exit или quit",
    saving_history: "Сохранение истории и завершение сессии.",
    interrupted: "Прервано.",

    analyze_start: "Начало анализа папки: ",
    analyze_folder: "Анализируется папка: ",
    upload_skipping_large: "Пропуск большого файла: ",
    upload_file: "  Загрузка: {file_name} как {mime_type}...",
    upload_fallback: "  [Резерв]: Загрузка без явного mime_type...",
    upload_failed: "  Не удалось загрузить {file_name}: {error}",
    analyze_usage_error: "🛑 Ошибка использования: /analyze folder_name \"Ваш запрос анализа\"",
    analyze_usage_note: "   ПРИМЕЧАНИЕ: Запрос (вопрос) должен быть заключен в двойные кавычки.",
    error_folder_not_found: "Ошибка: Путь к папке не найден: ",
    analyze_check_exists: "Директория существует",
    analyze_check_not_found: "Директория не найдена",
    analyze_failed_no_files: "🛑 Анализ не удался для пути '{path}'. Результат проверки пути: '{check}'. Файлы не были загружены.",
    cleanup_start: "Очистка загруженных файлов...",
    cleanup_warning: "  Предупреждение: Не удалось удалить {file_name}: {error}",

    lang_title: "Выбор языка",
    lang_prompt: "Пожалуйста, выберите ваш язык (По умолчанию английский):",
    lang_1: "[1] Английский",
    lang_2: "[2] Русский",
    lang_3: "[3] Турецкий",
    lang_input: "Ваш выбор [1/2/3 или EN/RU/TR]: ",
    lang_selected: "Выбранный язык: {lang}",
    lang_invalid: "Неверный выбор. Пожалуйста, введите 1, 2, 3, или код языка.",
    sysinfo_non_linux: "Получение системной информации пропущено (ОС не Linux).",

    mode_title: "Выбор Режима",
    mode_prompt: "Пожалуйста, выберите режим взаимодействия:",
    mode_1: "[1] Стандартный Текстовый Чат",
    mode_2: "[2] Голосовой Чат (Слушает и отвечает текстом)",
    mode_input: "Ваш выбор [1/2]: ",
    mode_selected_text: "Запуск Стандартного Текстового Чата...",
    mode_selected_voice: "Запуск Голосового Чата (Ожидание голосового ввода)...",

    voice_prompt: ">> Скажите: ",
    voice_exit: "Скажите 'exit' или 'quit' для завершения сессии.",
    voice_ready: "🔊 Уровень шума настроен. Готово.",
    voice_listening: "🎙️ Слушаю...",
    voice_recognizing: "🧠 Распознаю вашу речь...",
    voice_recognized: "✅ Распознано: ",
    voice_error_speech: "❌ Не удалось распознать речь. Попробуйте снова.",
    voice_error_mic: "❌ Не найден подходящий микрофон или ошибка при захвате аудио.",
    voice_error_request: "❌ Ошибка API распознавания речи: ",
    voice_error_no_key: "❌ Для голосового режима нужна переменная GOOGLE_SPEECH_API_KEY.",
    voice_sending: "✨ Отправляю в Gemini: ",

    system_instruction: "Ты — высокоинтеллектуальный CLI-ассистент. Твоя задача — анализировать предоставленные файлы (код, текст, изображения) и историю команд, отвечая кратко, точно и используя Markdown для форматирования кода. Если файлы прикреплены, фокусируйся на их анализе. Если пользователь пытается загрузить файлы, но операция завершилась с ошибкой, вежливо объясни, что не удалось найти файлы или папка не существует, и попроси проверить путь.",
};

pub static TR: Messages = Messages {
    name: "Türkçe",
    app_title: "Gemini CLI Asistanı: Geçmiş Yönetimi, Dosya Analizi ve Ses Modu",
    exit_command: "çıkış veya çık",
    error_api: "Gemini API Hatası: ",
    error_unexpected: "Beklenmeyen hata: ",
    error_init: "Gemini başlatma hatası: ",
    error_api_key: "Hata: 'GEMINI_API_KEY' ortam değişkeni bulunamadı.",
    error_config: "Yapılandırma hatası: ",
    error_saving_history: "Geçmiş kaydedilemedi: ",

    history_available: "📚 Mevcut dizindeki geçmişler:",
    history_none: "💡 Mevcut geçmiş dosyası bulunamadı. Yeni bir tane oluşturulacak.",
    history_default_name: "   (Varsayılan ad kullanılacak: {default_name})",
    history_prompt_1: "1. Mevcut bir diyaloğu yüklemek için geçmiş numarası [1, 2, 3...].",
    history_prompt_2: "2. Yeni bir geçmiş oluşturmak/devam etmek için yeni ad (örn: 'project_A.chat_history.txt').",
    history_prompt_input: "Seçiminiz (veya yeni bir geçmiş için Enter): ",
    history_loading_existing: "Mevcut geçmiş yükleniyor: ",
    history_creating_new: "Yeni geçmiş oluşturuluyor: ",
    history_invalid_number: "Geçersiz numara. 1 ile {max} arasında bir sayı girin.",

    chat_mode_title: "Gemini CLI Sohbet Modu. Geçmiş: ",
    command_title: "KOMUTLAR:",
    command_1: "1. Diyalog: Sadece sorunuzu yazın.",
    command_2: "2. Analiz:  /analyze <klasör_yolu> \"Sorunuz\" (Kod, metin, PNG, JPG destekler)",
    command_3: "3. Çıkış:     çıkış veya çık",
    saving_history: "Geçmiş kaydediliyor ve oturum sonlandırılıyor.",
    interrupted: "Kesildi.",

    analyze_start: "Klasör analizi başlatılıyor: ",
    analyze_folder: "Klasör analiz ediliyor: ",
    upload_skipping_large: "Büyük dosya atlanıyor: ",
    upload_file: "  Yükleniyor: {file_name}, tür: {mime_type}...",
    upload_fallback: "  [Yedek]: Açık mime_type olmadan yükleniyor...",
    upload_failed: "  Yüklenemedi {file_name}: {error}",
    analyze_usage_error: "🛑 Kullanım Hatası: /analyze klasör_adı \"Analiz sorgunuz\"",
    analyze_usage_note: "   NOT: Sorgu (soru) çift tırnak içinde olmalıdır.",
    error_folder_not_found: "Hata: Klasör yolu bulunamadı: ",
    analyze_check_exists: "Dizin mevcut",
    analyze_check_not_found: "Dizin bulunamadı",
    analyze_failed_no_files: "🛑 '{path}' yolu için analiz başarısız oldu. Yol kontrol sonucu: '{check}'. Geçerli dosya yüklenemedi.",
    cleanup_start: "Yüklenen dosyalar temizleniyor...",
    cleanup_warning: "  Uyarı: {file_name} silinemedi: {error}",

    lang_title: "Dil Seçimi",
    lang_prompt: "Lütfen dilinizi seçin (Varsayılan İngilizce'dir):",
    lang_1: "[1] İngilizce",
    lang_2: "[2] Rusça",
    lang_3: "[3] Türkçe",
    lang_input: "Seçiminiz [1/2/3 veya EN/RU/TR]: ",
    lang_selected: "Seçilen dil: {lang}",
    lang_invalid: "Geçersiz seçim. Lütfen 1, 2, 3, veya dil kodunu girin.",
    sysinfo_non_linux: "Sistem bilgisi alımı atlandı (Linux dışı işletim sistemi).",

    mode_title: "Mod Seçimi",
    mode_prompt: "Lütfen etkileşim modunu seçin:",
    mode_1: "[1] Standart Metin Sohbeti",
    mode_2: "[2] Sesli Sohbet (Dinle ve yanıtla)",
    mode_input: "Seçiminiz [1/2]: ",
    mode_selected_text: "Standart Metin Sohbeti başlatılıyor...",
    mode_selected_voice: "Sesli Sohbet Modu başlatılıyor (Giriş bekleniyor)...",

    voice_prompt: ">> Konuşun: ",
    voice_exit: "Oturumu sonlandırmak için 'exit' veya 'quit' deyin.",
    voice_ready: "🔊 Gürültü seviyesi ayarlandı. Hazır.",
    voice_listening: "🎙️ Dinleniyor...",
    voice_recognizing: "🧠 Konuşmanız tanınıyor...",
    voice_recognized: "✅ Tanındı: ",
    voice_error_speech: "❌ Ses anlaşılamadı. Lütfen tekrar deneyin.",
    voice_error_mic: "❌ Uygun mikrofon bulunamadı veya ses yakalama sırasında hata oluştu.",
    voice_error_request: "❌ Konuşma Tanıma API Hatası: ",
    voice_error_no_key: "❌ Sesli mod için GOOGLE_SPEECH_API_KEY ayarlanmalıdır.",
    voice_sending: "✨ Gemini'ye gönderiliyor: ",

    system_instruction: "Sen yüksek zekalı bir CLI asistanısın. Görevin, sağlanan dosyaları (kod, metin, görseller) ve komut geçmişini analiz etmek, kısa ve doğru yanıtlar vermek ve kod biçimlendirmesi için Markdown kullanmaktır. Dosyalar eklenmişse analize odaklan. Kullanıcı dosya yüklemeye çalışırsa ancak işlem başarısız olursa, dosyaların bulunamadığını veya klasörün mevcut olmadığını kibarca açıkla ve yolu kontrol etmesini iste.",
};
