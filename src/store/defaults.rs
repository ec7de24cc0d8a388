use phf::phf_set;

pub(crate) static DISPOSABLE_DOMAINS: phf::Set<&'static str> = phf_set! {
    "10minutemail.com",
    "20minutemail.com",
    "dispostable.com",
    "fakeinbox.com",
    "getnada.com",
    "guerrillamail.com",
    "guerrillamail.net",
    "mailinator.com",
    "maildrop.cc",
    "mintemail.com",
    "mohmal.com",
    "sharklasers.com",
    "spamgourmet.com",
    "temp-mail.org",
    "tempmail.com",
    "throwawaymail.com",
    "trashmail.com",
    "yopmail.com",
};

pub(crate) static FREE_PROVIDERS: phf::Set<&'static str> = phf_set! {
    "aol.com",
    "gmail.com",
    "gmx.com",
    "gmx.de",
    "googlemail.com",
    "hotmail.com",
    "icloud.com",
    "live.com",
    "mail.com",
    "me.com",
    "msn.com",
    "outlook.com",
    "protonmail.com",
    "yahoo.com",
    "yandex.com",
    "zoho.com",
};

pub(crate) static ROLE_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "abuse",
    "admin",
    "billing",
    "contact",
    "help",
    "hello",
    "hostmaster",
    "hr",
    "info",
    "marketing",
    "no-reply",
    "noreply",
    "office",
    "postmaster",
    "sales",
    "support",
    "team",
    "webmaster",
};
