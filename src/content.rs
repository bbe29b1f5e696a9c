use crate::page::Page;

pub struct Step {
    pub title: &'static str,
    pub body: &'static str,
}

pub struct Testimonial {
    pub name: &'static str,
    pub role: &'static str,
    pub text: &'static str,
    pub image: &'static str,
}

pub const HERO_LEDE: &str = "Track symptoms, identify patterns, and receive evidence-based wellness insights. Your intelligent companion for managing eczema, acne, and psoriasis care.";

pub const TAGLINE: &str = "Empowering your skin health journey with artificial intelligence and evidence-based wellness tracking.";

pub const STICKY_DISCLAIMER: &str =
    "Not a medical device. For informational use only. Consult a doctor for medical concerns.";

pub const HOME_STEPS: [Step; 3] = [
    Step {
        title: "1. Snap & Upload",
        body: "Take a clear photo of the skin area or describe your symptoms in detail using our secure form.",
    },
    Step {
        title: "2. AI Analysis",
        body: "Our AI scans visual patterns and cross-references them with high-authority medical sources on Google.",
    },
    Step {
        title: "3. Track & Manage",
        body: "Get personalized wellness tips, trusted resource links, and log your progress over time.",
    },
];

pub const TESTIMONIALS: [Testimonial; 3] = [
    Testimonial {
        name: "Sarah Jenkins",
        role: "Eczema Warrior",
        text: "This app helped me identify that stress was my biggest trigger. The wellness tips are spot on and so calming when I'm having a flare-up.",
        image: "https://images.unsplash.com/photo-1494790108377-be9c29b29330?auto=format&fit=crop&q=80&w=150",
    },
    Testimonial {
        name: "Michael Chen",
        role: "Psoriasis Patient",
        text: "Tracking my skin used to be a mess of notes. Now I have a clean history with photos to show my dermatologist during visits.",
        image: "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?auto=format&fit=crop&q=80&w=150",
    },
    Testimonial {
        name: "Emma Wilson",
        role: "Skincare Enthusiast",
        text: "I love that it doesn't try to be a doctor. It just gives practical advice and helps me stay consistent with my moisturizing routine.",
        image: "https://images.unsplash.com/photo-1438761681033-6461ffad8d80?auto=format&fit=crop&q=80&w=150",
    },
];

/// Body copy for a content page, as markdown. The home page is assembled from sections instead.
pub fn page_markdown(page: Page) -> &'static str {
    match page {
        Page::Home => "",
        Page::About => ABOUT,
        Page::Features => FEATURES,
        Page::Privacy => PRIVACY,
        Page::Terms => TERMS,
        Page::Contact => CONTACT,
        Page::Testimonials => TESTIMONIALS_INTRO,
        Page::CookiePolicy => COOKIE_POLICY,
        Page::Disclaimer => DISCLAIMER,
        Page::HowItWorks => HOW_IT_WORKS,
    }
}

const ABOUT: &str = r#"DermAI Coach was founded on a simple mission: to empower individuals living with chronic skin conditions through technology and evidence-based wellness.

> "We believe that consistent tracking and reliable information are the first steps towards better skin health."

We understand that managing skin health can be a daily challenge. Our AI-powered platform provides a private, secure, and supportive space to track your journey, identify triggers, and find reliable wellness information.

While we are not a replacement for professional medical advice, we strive to be the best companion for your day-to-day management, helping you communicate better with your dermatologist.
"#;

const FEATURES: &str = r#"Explore the tools we've built to help you manage your skin health journey effectively.

### Visual Tracking

Upload photos securely to monitor visual changes over time. Our AI helps you note subtle differences you might miss.

### Smart Suggestions

Receive personalized, non-medical wellness tips based on your logs, such as moisturizing techniques or stress management.

### Trusted Resources

We automatically search high-authority medical sources to provide you with relevant reading material for your specific symptoms.
"#;

const PRIVACY: &str = r#"**Effective Date:** January 1, 2024

At DermAI Coach, we take your privacy seriously. This Privacy Policy explains how we collect, use, and protect your personal information.

### 1. Information We Collect

We collect images and text descriptions you voluntarily provide for analysis. We do not store this data permanently on our servers after the session ends in this preview version.

### 2. How We Use Information

- To provide wellness analysis and summaries.
- To improve our AI models (only with explicit consent).
- We do **not** sell your data to third parties.
"#;

const TERMS: &str = r#"By accessing and using DermAI Coach, you agree to be bound by these Terms of Service.

### Medical Disclaimer

> DermAI Coach is NOT a medical device and does not provide medical diagnoses. Always consult a healthcare professional for medical advice.

### User Responsibilities

You are responsible for maintaining the confidentiality of your information and ensuring that your use of the service complies with local laws. You must be at least 18 years of age to use this service.
"#;

const CONTACT: &str = "We'd love to hear from you. Whether you have a question about features, trials, or just want to say hello.";

const TESTIMONIALS_INTRO: &str =
    "Read stories from our community about how they use DermAI Coach to manage their skin health.";

const COOKIE_POLICY: &str = r#"We believe in transparency about how we use your data.

### 1. What are cookies?

Cookies are small text files that are stored on your computer or mobile device when you visit a website. They allow the website to remember your actions and preferences over a period of time.

### 2. How we use cookies

DermAI Coach uses cookies for the following purposes:

- **Essential Cookies:** Necessary for the website to function properly, such as remembering your session state.
- **Analytics Cookies:** Help us understand how visitors interact with the website by collecting and reporting information anonymously.
- **Preference Cookies:** Allow the website to remember choices you make (such as your preferred language) to provide enhanced features.

### 3. Managing Cookies

You can control and/or delete cookies as you wish. You can delete all cookies that are already on your computer and you can set most browsers to prevent them from being placed. However, if you do this, you may have to manually adjust some preferences every time you visit a site.
"#;

const DISCLAIMER: &str = r#"> **Important Medical Notice.** DermAI Coach is designed for informational and educational purposes only. It is **NOT** a substitute for professional medical advice, diagnosis, or treatment.

### 1. Not a Medical Device

The content, including text, graphics, images, and other material contained on this website ("Content") are for informational purposes only. The Content is not intended to be a substitute for professional medical advice, diagnosis, or treatment.

### 2. Consult Your Doctor

Always seek the advice of your physician or other qualified health provider with any questions you may have regarding a medical condition. Never disregard professional medical advice or delay in seeking it because of something you have read on this website.

### 3. Emergency Situations

If you think you may have a medical emergency, call your doctor or 911 immediately. DermAI Coach does not recommend or endorse any specific tests, physicians, products, procedures, opinions, or other information that may be mentioned on the Site.

### 4. Accuracy of Information

While we strive to provide accurate and up-to-date information through our AI analysis and search features, medical knowledge is constantly evolving. We cannot guarantee that all information provided is completely current or exhaustive.
"#;

const HOW_IT_WORKS: &str = r#"DermAI Coach uses state-of-the-art artificial intelligence combined with real-time medical knowledge grounding to provide you with instant, reliable skin wellness insights. Here is a look under the hood.

### 1. Secure & Private Input

When you upload an image or type a description, your data is processed securely. We prioritize privacy by design: your images are analyzed in real-time and are not permanently stored on our servers for this session.

### 2. Advanced Vision Analysis

Our system uses the **Gemini 3** multimodal AI model. It breaks down the visual components of your skin photo (texture, color, and distribution) just like a skilled observer would note patterns, but without making a medical diagnosis.

### 3. Medical Knowledge Grounding

Unlike standard chatbots that might "hallucinate," DermAI Coach is connected to **Google Search Grounding**.

When the AI sees a symptom, it performs a real-time search against trusted medical repositories (like major health organizations and medical journals) to verify its wellness suggestions. This ensures the tips you receive are evidence-based and up-to-date.

### 4. Actionable Wellness Summary

Finally, we compile everything into a simple, easy-to-read report. You get a visual observation summary, a symptom check, and 1-3 practical wellness tips (like "apply a cool compress" or "use fragrance-free moisturizer") along with links to the trusted articles we found.
"#;
